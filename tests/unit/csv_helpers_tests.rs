//! Unit tests for CSV header detection, naming and type inference

use std::path::Path;

use rust_csv2sql::convert::{
    detect_header, escape_csv_value, extract_name_from_linkedin_url, infer_sql_type,
    is_name_column, sanitize_column_names, sanitize_person_name, table_name_from_path,
};

// ============================================================================
// Header detection
// ============================================================================

#[test]
fn test_header_detection_on_typical_exports() {
    assert!(detect_header("Full Name,Email,Company,LinkedIn Profile"));
    assert!(detect_header("id;name;created_at"));
    assert!(!detect_header("john@doe.com,John,Doe"));
    assert!(!detect_header("Acme,acme.net,12"));
    assert!(!detect_header("x,https://linkedin.com/in/someone"));
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_column_names_from_messy_headers() {
    let names = sanitize_column_names(&["First Name", "first-name", "", "1st Contact", "Revenue ($)"]);
    assert_eq!(
        names,
        vec!["first_name", "first_name_2", "col_2", "col_1st_contact", "revenue____"]
    );
}

#[test]
fn test_table_names_from_paths() {
    assert_eq!(table_name_from_path(Path::new("exports/Q1 Leads.csv")), "q1_leads");
    assert_eq!(table_name_from_path(Path::new("99problems.csv")), "table_99problems");
}

#[test]
fn test_person_names() {
    assert_eq!(sanitize_person_name("  François   Hollande ").as_deref(), Some("francois-hollande"));
    assert_eq!(sanitize_person_name("Anne-Marie d'Arc").as_deref(), Some("anne-marie-darc"));
    assert_eq!(sanitize_person_name("Ωmega"), Some("mega".to_string()));
    assert_eq!(sanitize_person_name("???"), None);
}

#[test]
fn test_name_columns_are_detected_broadly() {
    assert!(is_name_column("Contact Name"));
    assert!(is_name_column("company_name"));
    assert!(is_name_column("Surname"));
    assert!(!is_name_column("Email"));
}

#[test]
fn test_linkedin_name_extraction() {
    assert_eq!(
        extract_name_from_linkedin_url("https://www.linkedin.com/in/ana-maria-lopez-0b1a2c3d/?locale=es").as_deref(),
        Some("ana maria lopez")
    );
    assert_eq!(
        extract_name_from_linkedin_url("https://linkedin.com/in/prince").as_deref(),
        Some("prince")
    );
    assert_eq!(
        extract_name_from_linkedin_url("https://linkedin.com/in/r2d2").as_deref(),
        Some("r2d2")
    );
}

// ============================================================================
// Type inference and value escaping
// ============================================================================

#[test]
fn test_infer_types_from_samples() {
    assert_eq!(infer_sql_type(&["12", "", "-4"]), "INT");
    assert_eq!(infer_sql_type(&["12", "3.5"]), "DECIMAL(10,2)");
    assert_eq!(infer_sql_type(&["yes", "no"]), "VARCHAR(50)");
    assert_eq!(infer_sql_type(&["01/02/2024", "2024-05-06 07:08"]), "DATETIME");
}

#[test]
fn test_escape_values_for_columns() {
    assert_eq!(escape_csv_value("1500.50", "revenue", "DECIMAL(10,2)").to_string(), "1500.50");
    assert_eq!(escape_csv_value("n/a", "revenue", "DECIMAL(10,2)").to_string(), "'n/a'");
    assert_eq!(escape_csv_value("False", "active", "BOOLEAN").to_string(), "FALSE");
    assert_eq!(escape_csv_value("maybe", "active", "BOOLEAN").to_string(), "'maybe'");
    assert_eq!(escape_csv_value("Ann O'Neil", "Contact Name", "TEXT").to_string(), "'ann-oneil'");
    assert_eq!(escape_csv_value("it's", "notes", "TEXT").to_string(), "'it''s'");
}
