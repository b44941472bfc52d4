//! Display mapping for job board records.
//!
//! The backend sends raw job rows; everything shown to a visitor (job type, "posted" text,
//! placeholder logo, experience range, requirement bullets) is derived here.

use crate::model::{CompanyFromApi, Job, JobDetailFromApi, JobFromApi, JobType};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Tags shown on a job in list views.
pub const LIST_TAG_LIMIT: usize = 4;
const REQUIREMENT_LIMIT: usize = 6;
const REQUIREMENT_MIN_CHARS: usize = 10;

// Characters a URI component may carry unescaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');
const LOGO_COLORS: [&str; 6] = ["0D8ABC", "FF5722", "673AB7", "4CAF50", "E91E63", "3F51B5"];

pub fn map_job(job: &JobFromApi, now: OffsetDateTime) -> Job {
    Job {
        id: job.id.clone(),
        title: job.role.clone(),
        company: job.company_name.clone(),
        location: job.location.clone(),
        job_type: derive_job_type(&job.location),
        salary: String::new(),
        posted_at: format_posted_at(&job.posted_at, now),
        description: String::new(),
        requirements: Vec::new(),
        logo: logo_url(&job.company_name),
        tags: job.skills.iter().take(LIST_TAG_LIMIT).cloned().collect(),
        apply_url: job.apply_url.clone(),
        source: job.source,
        experience: String::new(),
    }
}

/// Like [`map_job`], plus description, requirements, experience and every tag.
pub fn map_job_detail(detail: &JobDetailFromApi, now: OffsetDateTime) -> Job {
    Job {
        description: detail.description.clone(),
        requirements: extract_requirements(&detail.description),
        tags: detail.job.skills.clone(),
        experience: format_experience(detail.min_experience, detail.max_experience),
        ..map_job(&detail.job, now)
    }
}

pub fn derive_job_type(location: &str) -> JobType {
    let l = location.to_lowercase();
    if l.contains("remote") {
        JobType::Remote
    } else if l.contains("hybrid") {
        JobType::Hybrid
    } else {
        JobType::Onsite
    }
}

/// Relative age of a posting. Dates that don't parse are shown as sent.
pub fn format_posted_at(posted_at: &str, now: OffsetDateTime) -> String {
    let Ok(posted) = OffsetDateTime::parse(posted_at, &Rfc3339) else {
        return posted_at.to_string();
    };
    let hours = (now - posted).whole_hours();
    if hours < 1 {
        return "Just now".to_string();
    }
    if hours < 24 {
        return format!("{hours}h ago");
    }
    match hours / 24 {
        1 => "1 day ago".to_string(),
        days => format!("{days} days ago"),
    }
}

/// Placeholder avatar for a company without a logo.
pub fn logo_url(company_name: &str) -> String {
    let plus_joined = company_name.split_whitespace().collect::<Vec<_>>().join("+");
    // Color choice follows the UTF-16 length so existing avatars keep their color.
    let color = LOGO_COLORS[company_name.encode_utf16().count() % LOGO_COLORS.len()];
    format!(
        "https://ui-avatars.com/api/?name={}&background={color}&color=fff",
        utf8_percent_encode(&plus_joined, URI_COMPONENT)
    )
}

pub fn format_experience(min: Option<u32>, max: Option<u32>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{min}-{max} Years"),
        (Some(min), None) => format!("{min}+ Years"),
        (None, Some(max)) => format!("Up to {max} Years"),
        (None, None) => "Not specified".to_string(),
    }
}

/// Bullet lines of a description, bullet removed, short fragments dropped.
pub fn extract_requirements(description: &str) -> Vec<String> {
    description
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(['-', '•', '*']))
        .map(|item| item.trim().to_string())
        .filter(|item| item.chars().count() > REQUIREMENT_MIN_CHARS)
        .take(REQUIREMENT_LIMIT)
        .collect()
}

pub fn filter_by_type(jobs: Vec<Job>, job_type: Option<JobType>) -> Vec<Job> {
    match job_type {
        Some(t) => jobs.into_iter().filter(|j| j.job_type == t).collect(),
        None => jobs,
    }
}

/// Case-insensitive substring match on company name; an empty search keeps everything.
pub fn filter_companies(companies: Vec<CompanyFromApi>, search: Option<&str>) -> Vec<CompanyFromApi> {
    let needle = search.map(str::trim).unwrap_or_default().to_lowercase();
    if needle.is_empty() {
        return companies;
    }
    companies
        .into_iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JobSource;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-03-10 12:00:00 UTC);

    fn api_job() -> JobFromApi {
        JobFromApi {
            id: "j1".into(),
            company_name: "Acme Labs".into(),
            role: "Backend Engineer".into(),
            location: "Remote - EU".into(),
            skills: vec!["rust", "tokio", "sql", "k8s", "aws"]
                .into_iter()
                .map(String::from)
                .collect(),
            apply_url: "https://acme.dev/apply/j1".into(),
            source: JobSource::CompanyWebsite,
            posted_at: "2025-03-10T09:00:00Z".into(),
        }
    }

    #[test]
    fn job_type_is_derived_from_location() {
        assert_eq!(derive_job_type("REMOTE (US)"), JobType::Remote);
        assert_eq!(derive_job_type("Hybrid - Berlin"), JobType::Hybrid);
        assert_eq!(derive_job_type("Remote or hybrid"), JobType::Remote);
        assert_eq!(derive_job_type("New York, NY"), JobType::Onsite);
    }

    #[test]
    fn posted_text_buckets() {
        assert_eq!(format_posted_at("2025-03-10T11:30:00Z", NOW), "Just now");
        assert_eq!(format_posted_at("2025-03-10T09:00:00Z", NOW), "3h ago");
        assert_eq!(format_posted_at("2025-03-09T10:00:00Z", NOW), "1 day ago");
        assert_eq!(format_posted_at("2025-03-01T12:00:00Z", NOW), "9 days ago");
        assert_eq!(format_posted_at("2025-03-11T12:00:00Z", NOW), "Just now");
        assert_eq!(format_posted_at("last week", NOW), "last week");
    }

    #[test]
    fn logo_encodes_name_and_picks_color_by_length() {
        assert_eq!(
            logo_url("Acme Labs"),
            "https://ui-avatars.com/api/?name=Acme%2BLabs&background=4CAF50&color=fff"
        );
        assert_eq!(
            logo_url("Bolt"),
            "https://ui-avatars.com/api/?name=Bolt&background=E91E63&color=fff"
        );
        assert_eq!(
            logo_url("Café (Zürich)"),
            "https://ui-avatars.com/api/?name=Caf%C3%A9%2B(Z%C3%BCrich)&background=FF5722&color=fff"
        );
    }

    #[test]
    fn experience_ranges() {
        assert_eq!(format_experience(None, None), "Not specified");
        assert_eq!(format_experience(Some(2), Some(5)), "2-5 Years");
        assert_eq!(format_experience(Some(3), None), "3+ Years");
        assert_eq!(format_experience(None, Some(4)), "Up to 4 Years");
    }

    #[test]
    fn requirements_keep_long_bullets_only() {
        let description = "About us\n\
            - Build distributed systems\n\
            \u{2022} Own on-call rotations\n\
            * Short one\n\
            Not a bullet but long enough\n  \
            -   Write clear design documents\n\
            - a\n\
            - Mentor engineers on the team\n\
            - Review pull requests daily\n\
            - Improve deployment pipelines\n\
            - Talk to customers regularly";

        let reqs = extract_requirements(description);

        assert_eq!(
            reqs,
            vec![
                "Build distributed systems",
                "Own on-call rotations",
                "Write clear design documents",
                "Mentor engineers on the team",
                "Review pull requests daily",
                "Improve deployment pipelines",
            ]
        );
    }

    #[test]
    fn list_mapping_truncates_tags() {
        let job = map_job(&api_job(), NOW);

        assert_eq!(job.title, "Backend Engineer");
        assert_eq!(job.company, "Acme Labs");
        assert_eq!(job.job_type, JobType::Remote);
        assert_eq!(job.posted_at, "3h ago");
        assert_eq!(job.tags, vec!["rust", "tokio", "sql", "k8s"]);
        assert_eq!(job.source.label(), "Company Website");
        assert!(job.experience.is_empty());
        assert!(job.salary.is_empty());
    }

    #[test]
    fn detail_mapping_keeps_everything() {
        let detail = JobDetailFromApi {
            job: api_job(),
            min_experience: Some(3),
            max_experience: None,
            description: "- Operate Kubernetes clusters".into(),
        };

        let job = map_job_detail(&detail, NOW);

        assert_eq!(job.tags.len(), 5);
        assert_eq!(job.experience, "3+ Years");
        assert_eq!(job.requirements, vec!["Operate Kubernetes clusters"]);
        assert_eq!(job.description, "- Operate Kubernetes clusters");
    }

    #[test]
    fn local_filters() {
        let remote = map_job(&api_job(), NOW);
        let onsite = map_job(
            &JobFromApi {
                location: "Paris".into(),
                ..api_job()
            },
            NOW,
        );
        let kept = filter_by_type(vec![remote.clone(), onsite], Some(JobType::Remote));
        assert_eq!(kept, vec![remote]);

        let companies = vec![
            CompanyFromApi {
                name: "Acme Labs".into(),
                job_count: 3,
                logo: String::new(),
            },
            CompanyFromApi {
                name: "Bolt".into(),
                job_count: 1,
                logo: String::new(),
            },
        ];
        assert_eq!(filter_companies(companies.clone(), Some("  LABS ")).len(), 1);
        assert_eq!(filter_companies(companies, Some("")).len(), 2);
    }
}
