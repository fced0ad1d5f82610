use std::collections::HashMap;

use axum::extract::Multipart;

use crate::errors::AppError;

/// A file part of a multipart request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// The parts of a multipart request: the first `file` part plus every text field.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub file: Option<Upload>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    pub fn take_file(&mut self) -> Result<Upload, AppError> {
        self.file
            .take()
            .ok_or_else(|| AppError::Validation("file is required".to_string()))
    }

    pub fn take_field(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }
}

/// Drains a multipart body. Later `file` parts are ignored; a repeated text field keeps its last value.
pub async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
            if form.file.is_none() {
                form.file = Some(Upload {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read field '{name}': {e}")))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
