use serde_json::{Map, Value};

use crate::core::errors::ApiError;

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(retrieval) = expect_optional_object(root, "retrieval")? {
        validate_u64_field(retrieval, "retrieval.local_top_k", "local_top_k", 1, 100)?;
        validate_u64_field(retrieval, "retrieval.live_top_n", "live_top_n", 0, 20)?;
    }

    if let Some(context) = expect_optional_object(root, "context")? {
        validate_u64_field(
            context,
            "context.passage_char_limit",
            "passage_char_limit",
            1,
            100_000,
        )?;
        validate_u64_field(
            context,
            "context.preview_char_limit",
            "preview_char_limit",
            1,
            100_000,
        )?;
    }

    if let Some(llm) = expect_optional_object(root, "llm")? {
        validate_u64_field(
            llm,
            "llm.request_timeout_secs",
            "request_timeout_secs",
            1,
            3_600,
        )?;
        validate_u64_field(llm, "llm.max_retries", "max_retries", 0, 10)?;
        validate_u64_field(llm, "llm.retry_backoff_ms", "retry_backoff_ms", 1, 60_000)?;
    }

    if let Some(search) = expect_optional_object(root, "search")? {
        validate_u64_field(
            search,
            "search.request_timeout_secs",
            "request_timeout_secs",
            1,
            3_600,
        )?;
    }

    if let Some(filter) = expect_optional_object(root, "filter")? {
        for key in [
            "encyclopedia_markers",
            "textbook_markers",
            "heritage_markers",
        ] {
            if let Some(value) = filter.get(key) {
                let list = value
                    .as_array()
                    .ok_or_else(|| config_type_error(&format!("filter.{key}"), "array"))?;
                if list.iter().any(|entry| !entry.is_string()) {
                    return Err(config_type_error(
                        &format!("filter.{key}"),
                        "array of strings",
                    ));
                }
            }
        }
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_object()
            .map(Some)
            .ok_or_else(|| config_type_error(key, "object")),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    if let Some(value) = section.get(key) {
        let number = value
            .as_u64()
            .ok_or_else(|| config_type_error(path, "unsigned integer"))?;
        if number < min || number > max {
            return Err(ApiError::BadRequest(format!(
                "config field {path} must be between {min} and {max}, got {number}"
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::BadRequest(format!("config field {path} must be a {expected}"))
}
