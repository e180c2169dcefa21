use std::path::Path;

/// How a file is decoded, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Text rows split on the given delimiter byte.
    Delimited(u8),
    /// Spreadsheet workbook decoded by calamine.
    Workbook,
}

impl SourceFormat {
    /// Detects the format from the file extension (case-insensitive).
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(Self::Delimited(b',')),
            "tsv" | "tab" => Some(Self::Delimited(b'\t')),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension() {
        assert_eq!(SourceFormat::detect(Path::new("a.csv")), Some(SourceFormat::Delimited(b',')));
        assert_eq!(SourceFormat::detect(Path::new("a.TSV")), Some(SourceFormat::Delimited(b'\t')));
        assert_eq!(SourceFormat::detect(Path::new("dir/a.xlsx")), Some(SourceFormat::Workbook));
        assert_eq!(SourceFormat::detect(Path::new("a.ods")), Some(SourceFormat::Workbook));
    }

    #[test]
    fn unknown_or_missing_extension() {
        assert_eq!(SourceFormat::detect(Path::new("a.pdf")), None);
        assert_eq!(SourceFormat::detect(Path::new("README")), None);
    }
}
