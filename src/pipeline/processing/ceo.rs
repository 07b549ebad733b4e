use crate::domain::CeoPair;

/// Parse a `company_name,ceo` line.
///
/// Returns `None` unless the line has exactly two comma-separated fields.
pub fn parse_ceo_line(line: &str) -> Option<CeoPair> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut fields = line.split(',');
    let company = fields.next()?;
    let ceo = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    Some(CeoPair {
        company_name: company.trim().to_uppercase(),
        ceo: ceo.trim().to_string(),
    })
}
