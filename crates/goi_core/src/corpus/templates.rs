use std::collections::BTreeMap;

use crate::domain::{support_index, EmploymentRecord, SalaryRecord, SupportServicesRecord};

use super::model::{kind, MetaValue};

#[derive(Debug, Clone)]
pub(crate) struct ChunkDraft {
    pub source: String,
    pub text: String,
    pub metadata: BTreeMap<String, MetaValue>,
}

fn base_meta(kind: &str, institution: &str, degree: &str, year: i32) -> BTreeMap<String, MetaValue> {
    let mut meta = BTreeMap::new();
    meta.insert("kind".to_string(), MetaValue::from(kind));
    meta.insert("institution".to_string(), MetaValue::from(institution));
    meta.insert("degree".to_string(), MetaValue::from(degree));
    meta.insert("year".to_string(), MetaValue::from(i64::from(year)));
    meta
}

pub(crate) fn employment_sentence(r: &EmploymentRecord) -> ChunkDraft {
    let mut text = format!(
        "{} graduates from {} in {} had an employment rate of {:.1}%",
        r.degree, r.institution, r.year, r.employment_rate
    );
    if let Some(s) = r.median_salary {
        text.push_str(&format!(" and a median salary of {s:.0}"));
    }
    text.push('.');

    let mut metadata = base_meta(kind::EMPLOYMENT, &r.institution, &r.degree, r.year);
    metadata.insert("employment_rate".to_string(), MetaValue::from(r.employment_rate));
    if let Some(s) = r.median_salary {
        metadata.insert("median_salary".to_string(), MetaValue::from(s));
    }
    ChunkDraft {
        source: r
            .data_source
            .clone()
            .unwrap_or_else(|| "employment table".to_string()),
        text,
        metadata,
    }
}

pub(crate) fn salary_sentence(r: &SalaryRecord) -> ChunkDraft {
    let mut text = format!(
        "{} graduates from {} in {} earned a median salary of {:.0}",
        r.degree, r.institution, r.year, r.median_salary
    );
    if let (Some(p25), Some(p75)) = (r.salary_percentile_25, r.salary_percentile_75) {
        text.push_str(&format!(" (25th to 75th percentile: {p25:.0} to {p75:.0})"));
    }
    if let Some(rate) = r.employment_rate {
        text.push_str(&format!(" with an employment rate of {rate:.1}%"));
    }
    text.push('.');

    let mut metadata = base_meta(kind::SALARY, &r.institution, &r.degree, r.year);
    metadata.insert("median_salary".to_string(), MetaValue::from(r.median_salary));
    if let Some(rate) = r.employment_rate {
        metadata.insert("employment_rate".to_string(), MetaValue::from(rate));
    }
    ChunkDraft {
        source: r
            .data_source
            .clone()
            .unwrap_or_else(|| "salary table".to_string()),
        text,
        metadata,
    }
}

pub(crate) fn support_sentence(r: &SupportServicesRecord) -> ChunkDraft {
    let index = support_index(&r.services);
    let mut text = format!(
        "{} offers {} support services (support index {:.1})",
        r.institution,
        r.services.len(),
        index
    );
    if r.services.is_empty() {
        text.push('.');
    } else {
        text.push_str(&format!(": {}.", r.services.join(", ")));
    }
    if let Some(v) = r.career_services_rating {
        text.push_str(&format!(" Career services rating {v:.1} out of 5."));
    }
    if let Some(v) = r.alumni_network_strength {
        text.push_str(&format!(" Alumni network strength {v:.1} out of 5."));
    }

    let mut metadata = BTreeMap::new();
    metadata.insert("kind".to_string(), MetaValue::from(kind::SUPPORT_SERVICES));
    metadata.insert("institution".to_string(), MetaValue::from(r.institution.as_str()));
    metadata.insert("support_index".to_string(), MetaValue::from(index));
    metadata.insert(
        "service_count".to_string(),
        MetaValue::from(r.services.len() as i64),
    );
    ChunkDraft {
        source: "support services".to_string(),
        text,
        metadata,
    }
}

#[derive(Debug, Default)]
struct GroupStats {
    institutions: Vec<String>,
    rates: Vec<f64>,
    salaries: Vec<f64>,
}

fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        None
    } else {
        Some(v.iter().sum::<f64>() / v.len() as f64)
    }
}

fn distinct_count(v: &[String]) -> usize {
    let mut names: Vec<&str> = v.iter().map(String::as_str).collect();
    names.sort_unstable();
    names.dedup();
    names.len()
}

/// One aggregate chunk per (degree, year) with at least two employment rows.
pub(crate) fn employment_summaries(rows: &[&EmploymentRecord]) -> Vec<ChunkDraft> {
    let mut groups: BTreeMap<(String, i32), GroupStats> = BTreeMap::new();
    for r in rows {
        let g = groups.entry((r.degree.clone(), r.year)).or_default();
        g.institutions.push(r.institution.clone());
        g.rates.push(r.employment_rate);
        if let Some(s) = r.median_salary {
            g.salaries.push(s);
        }
    }

    let mut out = Vec::new();
    for ((degree, year), g) in groups {
        if g.rates.len() < 2 {
            continue;
        }
        let Some(avg_rate) = mean(&g.rates) else {
            continue;
        };
        let n = distinct_count(&g.institutions);
        let mut text = format!(
            "Across {n} institutions, {degree} graduates in {year} had an average employment rate of {avg_rate:.1}%"
        );
        let avg_salary = mean(&g.salaries);
        if let Some(s) = avg_salary {
            text.push_str(&format!(" and an average median salary of {s:.0}"));
        }
        text.push('.');

        let mut metadata = base_meta(kind::EMPLOYMENT_SUMMARY, "all", &degree, year);
        metadata.insert("employment_rate".to_string(), MetaValue::from(avg_rate));
        if let Some(s) = avg_salary {
            metadata.insert("median_salary".to_string(), MetaValue::from(s));
        }
        metadata.insert("record_count".to_string(), MetaValue::from(g.rates.len() as i64));
        out.push(ChunkDraft {
            source: "employment table summary".to_string(),
            text,
            metadata,
        });
    }
    out
}

/// One aggregate chunk per (degree, year) with at least two salary rows.
pub(crate) fn salary_summaries(rows: &[&SalaryRecord]) -> Vec<ChunkDraft> {
    let mut groups: BTreeMap<(String, i32), GroupStats> = BTreeMap::new();
    for r in rows {
        let g = groups.entry((r.degree.clone(), r.year)).or_default();
        g.institutions.push(r.institution.clone());
        g.salaries.push(r.median_salary);
    }

    let mut out = Vec::new();
    for ((degree, year), g) in groups {
        if g.salaries.len() < 2 {
            continue;
        }
        let Some(avg) = mean(&g.salaries) else {
            continue;
        };
        let lo = g.salaries.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = g.salaries.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let n = distinct_count(&g.institutions);
        let text = format!(
            "Across {n} institutions, {degree} graduates in {year} had an average median salary of {avg:.0} (lowest {lo:.0}, highest {hi:.0})."
        );

        let mut metadata = base_meta(kind::SALARY_SUMMARY, "all", &degree, year);
        metadata.insert("median_salary".to_string(), MetaValue::from(avg));
        metadata.insert("record_count".to_string(), MetaValue::from(g.salaries.len() as i64));
        out.push(ChunkDraft {
            source: "salary table summary".to_string(),
            text,
            metadata,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emp(inst: &str, degree: &str, year: i32, rate: f64, salary: Option<f64>) -> EmploymentRecord {
        EmploymentRecord {
            institution: inst.to_string(),
            degree: degree.to_string(),
            year,
            employment_rate: rate,
            median_salary: salary,
            data_source: None,
        }
    }

    #[test]
    fn employment_row_becomes_sentence_with_metadata() {
        let d = employment_sentence(&emp("IIT Delhi", "Engineering", 2024, 92.0, Some(850000.0)));
        assert_eq!(
            d.text,
            "Engineering graduates from IIT Delhi in 2024 had an employment rate of 92.0% and a median salary of 850000."
        );
        assert_eq!(d.source, "employment table");
        assert_eq!(d.metadata.get("year"), Some(&MetaValue::Int(2024)));
        assert_eq!(d.metadata.get("employment_rate").and_then(MetaValue::as_f64), Some(92.0));
    }

    #[test]
    fn summaries_need_two_rows_per_group() {
        let a = emp("A", "Engineering", 2024, 90.0, Some(100.0));
        let b = emp("B", "Engineering", 2024, 80.0, Some(300.0));
        let c = emp("C", "Arts", 2024, 70.0, None);
        let out = employment_summaries(&[&a, &b, &c]);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].text,
            "Across 2 institutions, Engineering graduates in 2024 had an average employment rate of 85.0% and an average median salary of 200."
        );
    }
}
