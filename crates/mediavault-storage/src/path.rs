//! Storage path generation.
//!
//! Object paths are partitioned by tenant and project prefix and made
//! unique per upload with a timestamp + random suffix, so concurrent
//! uploads never collide by construction and `put` never overwrites.

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Build a unique object path: `{client}/{project}/{millis}-{rand}-{name}`.
///
/// Absent scope keys collapse to `"_"` so the prefix structure stays
/// stable for unscoped uploads.
pub fn unique_object_path(
    client_id: Option<&str>,
    project_code: Option<&str>,
    file_name: &str,
) -> String {
    let client = segment(client_id);
    let project = segment(project_code);
    let millis = Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();

    format!(
        "{client}/{project}/{millis}-{suffix}-{}",
        sanitize(file_name)
    )
}

fn segment(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => sanitize(v),
        _ => "_".to_string(),
    }
}

/// Strip path separators and control characters from a user-supplied
/// name so it cannot escape its prefix.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
