use serde::{Deserialize, Serialize};

/// Pre-parsed raw inputs for a corpus build.
///
/// Notes:
/// - Source file formats (CSV, JSON, report files) are parsed by the surrounding
///   application; the core only sees these records.
/// - Optional numeric fields stay `None` when the source did not provide them;
///   templating omits them instead of guessing defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmploymentRecord {
    pub institution: String,
    pub degree: String,
    pub year: i32,
    pub employment_rate: f64,
    pub median_salary: Option<f64>,
    pub data_source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalaryRecord {
    pub institution: String,
    pub degree: String,
    pub year: i32,
    pub median_salary: f64,
    pub employment_rate: Option<f64>,
    pub salary_percentile_25: Option<f64>,
    pub salary_percentile_75: Option<f64>,
    pub data_source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupportServicesRecord {
    pub institution: String,
    pub services: Vec<String>,
    pub career_services_rating: Option<f64>,
    pub alumni_network_strength: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportDocument {
    pub id: String,
    pub text: String,
    pub source: String,
    // local_report|web_content
    pub kind: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawRecord {
    Employment(EmploymentRecord),
    Salary(SalaryRecord),
    SupportServices(SupportServicesRecord),
    Report(ReportDocument),
}

/// Weighted coverage of the support services an institution offers, on a 0-100 scale.
pub fn support_index(services: &[String]) -> f64 {
    let mut unique: Vec<String> = services
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    unique.sort();
    unique.dedup();
    if unique.is_empty() {
        return 0.0;
    }

    let mut score = 0.0f64;
    for s in unique.iter() {
        score += match s.as_str() {
            "career counseling" => 1.5,
            "internships" | "mentorship" => 1.3,
            "alumni network" => 1.2,
            "job fairs" => 1.1,
            "resume workshops" | "mock interviews" => 1.0,
            _ => 0.8,
        };
    }
    let normalized = (score / 12.0 * 100.0).min(100.0);
    (normalized.sqrt() * 100.0).round() / 100.0 * 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn support_index_is_zero_for_no_services() {
        assert_eq!(support_index(&[]), 0.0);
        assert_eq!(support_index(&["  ".to_string()]), 0.0);
    }

    #[test]
    fn support_index_ignores_case_and_duplicates() {
        let a = support_index(&["Career Counseling".to_string(), "career counseling ".to_string()]);
        let b = support_index(&["career counseling".to_string()]);
        assert_eq!(a, b);
        assert!(a > 0.0);
    }

    #[test]
    fn support_index_caps_at_one_hundred() {
        let many: Vec<String> = (0..40).map(|i| format!("service {i}")).collect();
        assert_eq!(support_index(&many), 100.0);
    }
}
