//! Row decoding for the two formats the engine accepts directly.
//!
//! JSON arrays of objects come from the upload collaborator; CSV bodies
//! are decoded here with the first record as the header row. XLSX and XML
//! sources are decoded upstream and arrive as JSON rows.

use domain::models::RawRow;

/// Convert JSON objects into raw rows. Scalar values are stringified the
/// way they would appear in a CSV export; nulls become empty strings.
pub fn rows_from_json(objects: &[serde_json::Map<String, serde_json::Value>]) -> Vec<RawRow> {
    objects
        .iter()
        .map(|object| {
            object
                .iter()
                .map(|(key, value)| (key.clone(), value_to_string(value)))
                .collect()
        })
        .collect()
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Decode a CSV body into raw rows. The first record is the header row;
/// short records pad missing values with empty strings.
pub fn rows_from_csv(data: &str) -> Result<Vec<RawRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                (
                    header.to_string(),
                    record.get(i).unwrap_or_default().to_string(),
                )
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_from_json_stringifies_scalars() {
        let objects = vec![json!({
            "member_number": "M-100",
            "monthly_premium": 129.95,
            "active": true,
            "middle_name": null
        })
        .as_object()
        .unwrap()
        .clone()];

        let rows = rows_from_json(&objects);
        assert_eq!(rows[0].get("member_number").unwrap(), "M-100");
        assert_eq!(rows[0].get("monthly_premium").unwrap(), "129.95");
        assert_eq!(rows[0].get("active").unwrap(), "true");
        assert_eq!(rows[0].get("middle_name").unwrap(), "");
    }

    #[test]
    fn test_rows_from_csv() {
        let csv = "Member Number,First Name,Last Name\nM-100,Jane,Doe\nM-101,John,Smith\n";
        let rows = rows_from_csv(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Member Number").unwrap(), "M-100");
        assert_eq!(rows[1].get("Last Name").unwrap(), "Smith");
    }

    #[test]
    fn test_rows_from_csv_short_record_pads_empty() {
        let csv = "a,b,c\n1,2\n";
        let rows = rows_from_csv(csv).unwrap();
        assert_eq!(rows[0].get("c").unwrap(), "");
    }

    #[test]
    fn test_rows_from_csv_preserves_order() {
        let csv = "n\n1\n2\n3\n";
        let rows = rows_from_csv(csv).unwrap();
        let values: Vec<&str> = rows.iter().map(|r| r.get("n").unwrap().as_str()).collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }
}
