use serde_json::Value;

/// Check the shape of a job returned by /convert, /convert-form or /jobs
pub fn assert_job_response(job: &Value) {
    let id = job.get("id").and_then(|v| v.as_str()).expect("Missing id");

    assert_eq!(
        job.get("download_url").and_then(|v| v.as_str()),
        Some(format!("/download/{}", id).as_str())
    );
    assert_eq!(
        job.get("filename").and_then(|v| v.as_str()),
        Some(format!("audiobook_{}.wav", id).as_str())
    );
    assert!(job.get("size_bytes").and_then(|v| v.as_u64()).unwrap_or(0) > 44);
    assert!(job.get("duration_seconds").and_then(|v| v.as_f64()).unwrap_or(0.0) > 0.0);
    assert!(job.get("text_length").and_then(|v| v.as_u64()).is_some());
    assert!(job.get("chunk_count").and_then(|v| v.as_u64()).unwrap_or(0) >= 1);
    assert!(job.get("skipped_chunks").and_then(|v| v.as_array()).is_some());
    assert!(job.get("voice").and_then(|v| v.as_str()).is_some());
    assert!(job.get("language").and_then(|v| v.as_str()).is_some());
    assert!(job.get("speed").and_then(|v| v.as_f64()).is_some());
    assert_eq!(job.get("format").and_then(|v| v.as_str()), Some("wav"));
    assert!(job.get("created_at").is_some());
}

/// Id of a job in a response body
pub fn job_id(job: &Value) -> String {
    job.get("id")
        .and_then(|v| v.as_str())
        .expect("Missing id")
        .to_string()
}
