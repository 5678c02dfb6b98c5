//! Backend endpoint paths.

pub fn job(base_url: &str) -> String {
    format!("{}/api/job", trim(base_url))
}

pub fn events(base_url: &str, job_id: &str) -> String {
    format!("{}/api/events/{}", trim(base_url), job_id)
}

pub fn config_properties(base_url: &str) -> String {
    format!("{}/api/config/properties", trim(base_url))
}

pub fn version(base_url: &str) -> String {
    format!("{}/api/version", trim(base_url))
}

pub fn status(base_url: &str) -> String {
    format!("{}/api/status", trim(base_url))
}

fn trim(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}
