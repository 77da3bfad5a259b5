use crate::domain::{EmploymentRecord, RawRecord, ReportDocument, SalaryRecord, SupportServicesRecord};

const INSTITUTIONS: [(&str, u8); 6] = [
    ("IIT Delhi", 0),
    ("IIT Bombay", 0),
    ("BITS Pilani", 0),
    ("VIT University", 1),
    ("Anna University", 1),
    ("Osmania University", 2),
];

const DEGREES: [(&str, f64); 6] = [
    ("Computer Science", 800_000.0),
    ("Engineering", 750_000.0),
    ("Data Science", 850_000.0),
    ("Business", 600_000.0),
    ("Arts", 400_000.0),
    ("Psychology", 450_000.0),
];

const YEARS: [i32; 3] = [2023, 2024, 2025];

const SERVICES: [&str; 10] = [
    "Career Counseling",
    "Resume Workshops",
    "Mock Interviews",
    "Job Fairs",
    "Alumni Network",
    "Mentorship",
    "Internships",
    "Industry Partnerships",
    "Startup Incubators",
    "Study Abroad",
];

fn is_stem(degree: &str) -> bool {
    matches!(degree, "Computer Science" | "Engineering" | "Data Science")
}

/// Sanitized, deterministic dataset large enough to make retrieval meaningful.
pub fn demo_records() -> Vec<RawRecord> {
    let mut out = Vec::new();

    for (i, (inst, tier)) in INSTITUTIONS.iter().enumerate() {
        let (rate_boost, salary_mult) = match tier {
            0 => (8.0, 1.5),
            1 => (5.0, 1.3),
            _ => (0.0, 1.0),
        };
        for (j, (degree, base_salary)) in DEGREES.iter().enumerate() {
            for year in YEARS {
                // Deterministic jitter in [-5, 5].
                let jitter = ((i * 7 + j * 3 + year as usize) % 11) as f64 - 5.0;
                let base_rate = if is_stem(degree) { 85.0 } else { 75.0 };
                let employment_rate = (base_rate + rate_boost + jitter).clamp(0.0, 98.0);
                let growth = 1.05f64.powi(year - 2024);
                let median_salary = (base_salary * salary_mult * growth).round();

                out.push(RawRecord::Employment(EmploymentRecord {
                    institution: inst.to_string(),
                    degree: degree.to_string(),
                    year,
                    employment_rate,
                    median_salary: Some(median_salary),
                    data_source: Some("Placement Survey".to_string()),
                }));
                out.push(RawRecord::Salary(SalaryRecord {
                    institution: inst.to_string(),
                    degree: degree.to_string(),
                    year,
                    median_salary,
                    employment_rate: Some(employment_rate),
                    salary_percentile_25: Some((median_salary * 0.8).round()),
                    salary_percentile_75: Some((median_salary * 1.3).round()),
                    data_source: Some("Salary Survey".to_string()),
                }));
            }
        }

        let take = 5 + (i % 4);
        out.push(RawRecord::SupportServices(SupportServicesRecord {
            institution: inst.to_string(),
            services: SERVICES.iter().take(take).map(|s| s.to_string()).collect(),
            career_services_rating: Some(4.0 + (i % 5) as f64 * 0.2),
            alumni_network_strength: Some(4.2 + (i % 4) as f64 * 0.2),
        }));
    }

    out.push(RawRecord::Report(ReportDocument {
        id: "industry_trends".to_string(),
        text: "The technology sector is projected to keep hiring strongly through 2030. \
               Data science and AI roles are particularly in demand, and starting salaries for these roles are rising faster than the market.\n\n\
               Hybrid and remote positions are expected to become the norm at most technology employers. \
               Emerging fields such as quantum computing, biotechnology and sustainable technology will create new high-paying opportunities."
            .to_string(),
        source: "Industry Report 2025-2030".to_string(),
        kind: "web_content".to_string(),
        date: Some("2025-01-15".to_string()),
    }));
    out.push(RawRecord::Report(ReportDocument {
        id: "career_services_effectiveness".to_string(),
        text: "Universities with comprehensive career services programs report higher employment rates within six months of graduation. \
               Key factors include early career counseling, strong alumni network connections, industry partnership programs, internship placement assistance, and resume and interview preparation workshops."
            .to_string(),
        source: "Career Services Study".to_string(),
        kind: "web_content".to_string(),
        date: Some("2024-02-01".to_string()),
    }));
    out.push(RawRecord::Report(ReportDocument {
        id: "salary_trends_analysis".to_string(),
        text: "Graduate salaries vary significantly by institution and degree program. \
               STEM graduates from top-tier universities command noticeably higher starting salaries. \
               Long-term career growth depends more on individual performance and networking than on initial institution ranking."
            .to_string(),
        source: "Salary Analysis Report".to_string(),
        kind: "web_content".to_string(),
        date: Some("2025-01-20".to_string()),
    }));

    out
}
