use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::domain::{
    Year,
    catalog::SkillCode,
    parse_loose_int,
    player::{NewPlayer, PlayerUpdate},
    yearly::YearlyFacts,
};

const PROFILE_COLUMNS: [&str; 6] = ["name", "club", "position", "rating", "nationality", "year"];

/// Defects that reject a whole file before any row is looked at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvStructureError {
    #[error("CSV vacío")]
    Empty,
    #[error("Falta columna: {0}")]
    MissingColumn(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportRowError {
    #[error("name vacío")]
    BlankName,
    #[error("no procesada (importación cancelada)")]
    Cancelled,
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn rejected(error: CsvStructureError) -> Self {
        Self {
            imported: 0,
            errors: vec![error.to_string()],
        }
    }

    pub fn record_row_error(&mut self, line_number: usize, error: &ImportRowError) {
        self.errors.push(format!("Línea {}: {}", line_number, error));
    }
}

/// A non-blank input line with its 1-based position in the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

pub fn split_lines(text: &str) -> Vec<CsvLine<'_>> {
    text.split('\n')
        .enumerate()
        .map(|(idx, line)| CsvLine {
            number: idx + 1,
            text: line.strip_suffix('\r').unwrap_or(line),
        })
        .filter(|line| !line.text.trim().is_empty())
        .collect()
}

#[derive(Debug, Clone)]
pub struct CsvHeader {
    columns: HashMap<String, usize>,
}

impl CsvHeader {
    pub fn parse(line: &str) -> Result<Self, CsvStructureError> {
        let mut columns = HashMap::new();
        for (idx, column) in line.split(',').enumerate() {
            columns.insert(column.trim().to_string(), idx);
        }
        let required = PROFILE_COLUMNS
            .iter()
            .copied()
            .chain(SkillCode::ALL.iter().map(|c| c.as_str()));
        for column in required {
            if !columns.contains_key(column) {
                return Err(CsvStructureError::MissingColumn(column.to_string()));
            }
        }
        Ok(Self { columns })
    }

    fn cell<'a>(&self, cells: &[&'a str], column: &str) -> Option<&'a str> {
        self.columns
            .get(column)
            .and_then(|idx| cells.get(*idx))
            .copied()
    }

    fn text_cell(&self, cells: &[&str], column: &str) -> Option<String> {
        self.cell(cells, column)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Positional split against the header. No quoting is recognised.
    pub fn read_row(&self, line: &str) -> ImportRow {
        let cells: Vec<&str> = line.split(',').collect();
        let skills = SkillCode::ALL
            .into_iter()
            .filter_map(|code| {
                self.cell(&cells, code.as_str())
                    .and_then(parse_loose_int)
                    .map(|value| (code, value))
            })
            .collect();
        ImportRow {
            name: self.text_cell(&cells, "name"),
            club: self.text_cell(&cells, "club"),
            position: self.text_cell(&cells, "position"),
            nationality: self.text_cell(&cells, "nationality"),
            rating: self.cell(&cells, "rating").and_then(parse_loose_int),
            year: self.cell(&cells, "year").and_then(parse_loose_int),
            skills,
        }
    }
}

/// Extra header columns are tolerated and ignored; that includes skill-like
/// columns that are not part of [`SkillCode`].
#[derive(Debug, Clone)]
pub struct ParsedCsv<'a> {
    pub header: CsvHeader,
    pub rows: Vec<CsvLine<'a>>,
}

pub fn parse_csv(text: &str) -> Result<ParsedCsv<'_>, CsvStructureError> {
    // Spreadsheet exports often start with a byte order mark.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = split_lines(text);
    if lines.len() < 2 {
        return Err(CsvStructureError::Empty);
    }
    let rows = lines.split_off(1);
    let header = CsvHeader::parse(lines[0].text)?;
    Ok(ParsedCsv { header, rows })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub name: Option<String>,
    pub club: Option<String>,
    pub position: Option<String>,
    pub nationality: Option<String>,
    pub rating: Option<i32>,
    pub year: Option<Year>,
    pub skills: BTreeMap<SkillCode, i32>,
}

impl ImportRow {
    pub fn new_player(&self, name: &str) -> NewPlayer {
        NewPlayer {
            name: name.to_string(),
            club: self.club.clone(),
            position: self.position.clone(),
            rating: self.rating,
            nationality: self.nationality.clone(),
        }
    }

    /// Only the cells that carry a value overwrite the stored profile.
    pub fn profile_update(&self) -> PlayerUpdate {
        PlayerUpdate {
            club: self.club.clone(),
            position: self.position.clone(),
            rating: self.rating,
            nationality: self.nationality.clone(),
        }
    }

    pub fn yearly_facts(&self) -> Option<YearlyFacts> {
        self.year.map(|year| {
            YearlyFacts::new(year)
                .with_rating(self.rating)
                .with_skills(self.skills.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,club,position,rating,nationality,year,PAC,SHO,PAS,DRI,DEF,PHY";

    fn first_row(text: &str) -> ImportRow {
        let parsed = parse_csv(text).unwrap();
        parsed.header.read_row(parsed.rows[0].text)
    }

    #[test]
    fn test_split_lines_keeps_original_numbers() {
        let text = "a\r\n\r\nb\n   \nc\n";
        let lines = split_lines(text);
        assert_eq!(
            lines,
            vec![
                CsvLine { number: 1, text: "a" },
                CsvLine { number: 3, text: "b" },
                CsvLine { number: 5, text: "c" },
            ]
        );
    }

    #[test]
    fn test_header_only_is_empty() {
        assert_eq!(parse_csv(HEADER).unwrap_err(), CsvStructureError::Empty);
        assert_eq!(parse_csv("").unwrap_err(), CsvStructureError::Empty);
        assert_eq!(
            CsvStructureError::Empty.to_string(),
            "CSV vacío".to_string()
        );
    }

    #[test]
    fn test_missing_column_is_reported_by_name() {
        let text = "name,club,position,rating,nationality,year,PAC,SHO,PAS,DRI,DEF\nMessi,Inter Miami,RW,90,Argentina,2023,80,88,90,94,33";
        let err = parse_csv(text).unwrap_err();
        assert_eq!(err, CsvStructureError::MissingColumn("PHY".to_string()));
        assert_eq!(err.to_string(), "Falta columna: PHY");
    }

    #[test]
    fn test_leading_byte_order_mark_is_ignored() {
        let text = format!("\u{feff}{}\nSaka,Arsenal,RW,87,England,2024,86,80,82,86,60,70", HEADER);
        let row = first_row(&text);
        assert_eq!(row.name.as_deref(), Some("Saka"));
    }

    #[test]
    fn test_first_missing_column_wins() {
        let text = "name,position,rating,year\nx,y,1,2020";
        assert_eq!(
            parse_csv(text).unwrap_err(),
            CsvStructureError::MissingColumn("club".to_string())
        );
    }

    #[test]
    fn test_header_columns_may_be_reordered_and_padded() {
        let text = format!(
            " PHY , DEF,DRI,PAS,SHO,PAC,year,nationality,rating,position,club,name ,extra\n{}",
            "70,40,85,80,75,90,2022,France, 91 ,ST,Real Madrid,Kylian Mbappe,ignored"
        );
        let row = first_row(&text);
        assert_eq!(row.name.as_deref(), Some("Kylian Mbappe"));
        assert_eq!(row.club.as_deref(), Some("Real Madrid"));
        assert_eq!(row.rating, Some(91));
        assert_eq!(row.year, Some(2022));
        assert_eq!(row.skills.get(&SkillCode::Pac), Some(&90));
        assert_eq!(row.skills.get(&SkillCode::Phy), Some(&70));
    }

    #[test]
    fn test_blank_and_unparsable_cells_are_absent() {
        let text = format!("{}\nPedri,,CM,abc,Spain,2023,82,,86,x,65,70", HEADER);
        let row = first_row(&text);
        assert_eq!(row.club, None);
        assert_eq!(row.rating, None);
        assert_eq!(row.skills.len(), 4);
        assert!(!row.skills.contains_key(&SkillCode::Sho));
        assert!(!row.skills.contains_key(&SkillCode::Dri));

        let update = row.profile_update();
        assert_eq!(update.club, None);
        assert_eq!(update.position.as_deref(), Some("CM"));
        assert_eq!(update.rating, None);
    }

    #[test]
    fn test_short_row_yields_missing_values() {
        let text = format!("{}\nGavi,Barcelona", HEADER);
        let row = first_row(&text);
        assert_eq!(row.name.as_deref(), Some("Gavi"));
        assert_eq!(row.year, None);
        assert!(row.skills.is_empty());
        assert!(row.yearly_facts().is_none());
    }

    #[test]
    fn test_yearly_facts_carry_rating_and_skills() {
        let text = format!("{}\nRodri,Man City,CDM,91,Spain,2024,66,80,86,84,87,85", HEADER);
        let row = first_row(&text);
        let facts = row.yearly_facts().unwrap();
        assert_eq!(facts.year, 2024);
        assert_eq!(facts.overall_rating, Some(91));
        assert_eq!(facts.skills.len(), 6);
    }

    #[test]
    fn test_report_formats_line_errors() {
        let mut report = ImportReport::default();
        report.record_row_error(4, &ImportRowError::BlankName);
        report.record_row_error(9, &ImportRowError::Cancelled);
        assert_eq!(
            report.errors,
            vec![
                "Línea 4: name vacío".to_string(),
                "Línea 9: no procesada (importación cancelada)".to_string(),
            ]
        );
    }
}
