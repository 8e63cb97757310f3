use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

/// Column headers and widths for the community import template; the import
/// side maps columns by these positions.
pub const COMMUNITY_COLUMNS: &[(&str, f64)] = &[
    ("name*", 15.0),
    ("district*", 12.0),
    ("address", 25.0),
    ("property fee", 15.0),
    ("parking", 20.0),
    ("build year", 10.0),
    ("metro / nearby", 20.0),
    ("primary school", 15.0),
    ("middle school", 15.0),
    ("environment score (1-10)", 12.0),
    ("notes", 30.0),
];

pub const PROPERTY_COLUMNS: &[(&str, f64)] = &[
    ("community name*", 15.0),
    ("building", 8.0),
    ("unit", 8.0),
    ("room", 8.0),
    ("area (sqm)*", 12.0),
    ("layout", 12.0),
    ("floor", 10.0),
    ("orientation", 10.0),
    ("decoration", 12.0),
    ("price (10k)*", 15.0),
    ("rent (per month)", 15.0),
    ("expected price (10k)", 15.0),
    ("visit date (YYYY-MM-DD)", 18.0),
    ("notes", 30.0),
];

fn write_header(sheet: &mut Worksheet, columns: &[(&str, f64)]) -> Result<(), XlsxError> {
    for (col, (header, width)) in columns.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
        sheet.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

/// Empty community workbook with one example row showing the expected cell
/// types.
pub fn community_template() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("communities")?;
    write_header(sheet, COMMUNITY_COLUMNS)?;

    sheet.write_string(1, 0, "Sample Court")?;
    sheet.write_string(1, 1, "Pudong")?;
    sheet.write_string(1, 2, "123 Example Rd")?;
    sheet.write_string(1, 3, "2.5 per sqm per month")?;
    sheet.write_string(1, 4, "50 above ground, 100 below")?;
    sheet.write_number(1, 5, 2015.0)?;
    sheet.write_string(1, 6, "Line 9, mall nearby")?;
    sheet.write_string(1, 7, "Pearl Primary")?;
    sheet.write_string(1, 8, "Pearl Middle")?;
    sheet.write_number(1, 9, 8.0)?;
    sheet.write_string(1, 10, "quiet, well kept")?;

    workbook.save_to_buffer()
}

/// Empty property workbook with one example row.
pub fn property_template() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("properties")?;
    write_header(sheet, PROPERTY_COLUMNS)?;

    sheet.write_string(1, 0, "Sample Court")?;
    sheet.write_string(1, 1, "1")?;
    sheet.write_string(1, 2, "1")?;
    sheet.write_string(1, 3, "101")?;
    sheet.write_number(1, 4, 120.0)?;
    sheet.write_string(1, 5, "3 bed 2 living")?;
    sheet.write_string(1, 6, "mid floor")?;
    sheet.write_string(1, 7, "south")?;
    sheet.write_string(1, 8, "renovated")?;
    sheet.write_number(1, 9, 800.0)?;
    sheet.write_number(1, 10, 6000.0)?;
    sheet.write_number(1, 11, 750.0)?;
    sheet.write_string(1, 12, "2024-01-15")?;
    sheet.write_string(1, 13, "good light")?;

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Catalog, InMemoryCatalog};
    use crate::entities::CommunityDraft;
    use crate::import::{import_communities, import_properties};

    #[tokio::test]
    async fn community_template_example_row_imports_cleanly() {
        let catalog = InMemoryCatalog::new();
        let bytes = community_template().unwrap();
        let outcome = import_communities(&catalog, &bytes).await.unwrap();
        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.errors, None);

        let community = catalog.get_community(outcome.created[0].id).await.unwrap().unwrap();
        assert_eq!(community.name, "Sample Court");
        assert_eq!(community.build_year, Some(2015));
        assert_eq!(community.environment_score, Some(8));
    }

    #[tokio::test]
    async fn property_template_example_row_imports_cleanly() {
        let catalog = InMemoryCatalog::new();
        catalog
            .create_community(&CommunityDraft {
                name: "Sample Court".to_string(),
                district: "Pudong".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let bytes = property_template().unwrap();
        let outcome = import_properties(&catalog, &bytes).await.unwrap();
        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.errors, None);

        let property = catalog.get_property(outcome.created[0].id).await.unwrap().unwrap();
        assert_eq!(property.area, Some(120.0));
        assert_eq!(property.price, Some(800.0));
        assert_eq!(property.rent, Some(6000.0));
        assert!(property.visit_date.is_some());
    }
}
