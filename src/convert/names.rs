//! Identifier and person-name handling for CSV conversion

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_]").expect("valid identifier regex"));

static TABLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("valid table name regex"));

static HYPHEN_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid hyphen regex"));

/// Fallback when a file name yields no usable table name.
const FALLBACK_TABLE_NAME: &str = "data_table";

/// Column-name fragments that mark a column as holding person names.
const NAME_INDICATORS: &[&str] = &[
    "name",
    "nombre",
    "nom",
    "nome",
    "full_name",
    "fullname",
    "complete_name",
    "first_name",
    "firstname",
    "fname",
    "given_name",
    "last_name",
    "lastname",
    "lname",
    "surname",
    "family_name",
    "middle_name",
    "middlename",
    "mname",
    "nick_name",
    "nickname",
    "nick",
    "alias",
    "display_name",
    "screen_name",
    "user_name",
    "username",
    "contact_name",
    "person_name",
    "client_name",
    "customer_name",
    "employee_name",
    "staff_name",
    "member_name",
];

/// Lower-cased name with every non-identifier character replaced by `_`.
/// Used to match table columns against CSV headers.
pub fn normalize_col_name(name: &str) -> String {
    NON_WORD_RE
        .replace_all(&name.trim().to_lowercase(), "_")
        .into_owned()
}

/// SQL-safe column name for a CSV header.
///
/// Blank headers become `col_<position>`; a leading digit gets a `col_`
/// prefix.
pub fn sanitize_column_name(raw: &str, position: usize) -> String {
    let cleaned = NON_WORD_RE.replace_all(raw.trim(), "_").to_lowercase();
    if cleaned.is_empty() {
        return format!("col_{}", position);
    }
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("col_{}", cleaned)
    } else {
        cleaned
    }
}

/// Make names unique by suffixing repeats with `_2`, `_3`, ...
pub fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut taken: std::collections::HashSet<String> = names.iter().cloned().collect();
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        let count = seen.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            out.push(name);
            continue;
        }
        let mut n = *count;
        let mut candidate = format!("{}_{}", name, n);
        while taken.contains(&candidate) {
            n += 1;
            candidate = format!("{}_{}", name, n);
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Sanitized, de-duplicated column names for a header row.
pub fn sanitize_column_names<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    let names = headers
        .iter()
        .enumerate()
        .map(|(i, h)| sanitize_column_name(h.as_ref(), i))
        .collect();
    dedupe_names(names)
}

/// Table name suggested for a CSV file: the file name up to its first dot,
/// sanitized, lower-cased, with a `table_` prefix when it starts with a digit.
pub fn table_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    let cleaned = NON_WORD_RE.replace_all(stem, "_").to_lowercase();

    if cleaned.is_empty() {
        FALLBACK_TABLE_NAME.to_string()
    } else if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("table_{}", cleaned)
    } else {
        cleaned
    }
}

/// A custom table name must start with a letter and contain only letters,
/// digits and underscores.
pub fn is_valid_table_name(name: &str) -> bool {
    TABLE_NAME_RE.is_match(name)
}

/// `data_table_` followed by eight random hex digits.
pub fn random_table_name() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}_{}", FALLBACK_TABLE_NAME, &id[..8])
}

/// Whether a column name suggests it holds person names.
pub fn is_name_column(column: &str) -> bool {
    let lower = column.trim().to_lowercase();
    NAME_INDICATORS.iter().any(|indicator| lower.contains(indicator))
}

/// ASCII replacement for accented Latin letters and ligatures.
fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => "s",
        'ţ' | 'ť' | 'ŧ' | 'ț' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'þ' => "th",
        _ => return None,
    };
    Some(folded)
}

/// Reduce a person name to a lower-case ASCII slug.
///
/// `"José O'Connor"` becomes `"jose-oconnor"`. Letters from non-Latin
/// scripts are dropped; `None` is returned when nothing survives.
pub fn sanitize_person_name(raw: &str) -> Option<String> {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    let mut slug = String::with_capacity(lower.len());
    for c in lower.chars() {
        if let Some(folded) = fold_latin(c) {
            slug.push_str(folded);
            continue;
        }
        match c {
            // combining diacritical marks
            '\u{0300}'..='\u{036F}' => {}
            '\'' | '`' | '´' | '^' | '~' | '"' | '’' => {}
            '_' | '.' | '/' | '\\' => slug.push('-'),
            c if c.is_whitespace() => slug.push('-'),
            'a'..='z' | '0'..='9' | '-' => slug.push(c),
            _ => {}
        }
    }

    let collapsed = HYPHEN_RUN_RE.replace_all(&slug, "-");
    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Person name guessed from a LinkedIn profile URL.
///
/// `linkedin.com/in/john-doe-12345` yields `"john doe"`. The last slug
/// segment is treated as a profile id, and dropped, only when it contains a
/// digit.
pub fn extract_name_from_linkedin_url(url: &str) -> Option<String> {
    let url = url.trim();
    let (_, after) = url.split_once("/in/")?;
    let slug = after
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();

    let mut parts: Vec<&str> = slug.split('-').filter(|p| !p.is_empty()).collect();
    if parts.len() > 1 && parts.last().is_some_and(|p| p.chars().any(|c| c.is_ascii_digit())) {
        parts.pop();
    }

    let name = parts.join(" ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
