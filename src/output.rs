use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::AppError;
use crate::models::{DataSource, Envelope, ErrorBody, Meta};

const ENVELOPE_VERSION: &str = "1.0.0";

pub fn success_envelope<T: Serialize>(data: T, source: DataSource) -> Envelope<T> {
    Envelope {
        ok: true,
        data: Some(data),
        meta: Meta {
            version: ENVELOPE_VERSION,
            source,
            sample: source == DataSource::StaticSample,
        },
        error: None,
    }
}

pub fn print_json<T: Serialize>(data: T, source: DataSource) {
    let envelope = success_envelope(data, source);
    println!(
        "{}",
        serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_error(format: OutputFormat, error: AppError) {
    match format {
        OutputFormat::Human | OutputFormat::Html => {
            eprintln!("Error [{}]: {}", error.code(), error);
        }
        OutputFormat::Json => {
            let envelope: Envelope<serde_json::Value> = Envelope {
                ok: false,
                data: None,
                meta: Meta {
                    version: ENVELOPE_VERSION,
                    source: DataSource::Internal,
                    sample: false,
                },
                error: Some(ErrorBody {
                    code: error.code(),
                    message: error.to_string(),
                }),
            };
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
}
