#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Cursor;

use archviz_studio::service::{
    ContentRequest, ContentResponse, GenerationBackend, Part, RemoteError,
};
use archviz_studio::source::SourceImage;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Backend that replays queued answers and records every request
#[derive(Default)]
pub struct ScriptedBackend {
    answers: RefCell<VecDeque<Result<ContentResponse, RemoteError>>>,
    requests: RefCell<Vec<(String, ContentRequest)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, answer: Result<ContentResponse, RemoteError>) -> Self {
        self.push(answer);
        self
    }

    pub fn push(&self, answer: Result<ContentResponse, RemoteError>) {
        self.answers.borrow_mut().push_back(answer);
    }

    pub fn requests(&self) -> Vec<ContentRequest> {
        self.requests.borrow().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn credentials(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn models(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|(_, r)| r.model.clone()).collect()
    }
}

impl GenerationBackend for ScriptedBackend {
    fn generate_content(
        &self,
        credential: &str,
        request: &ContentRequest,
    ) -> Result<ContentResponse, RemoteError> {
        self.requests
            .borrow_mut()
            .push((credential.to_owned(), request.clone()));
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteError::new(None, None, "no scripted answer left")))
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([120, 130, 140, 255]));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

pub fn source_image(width: u32, height: u32) -> SourceImage {
    SourceImage::from_bytes(png_bytes(width, height), "image/png").unwrap()
}

pub fn image_response(width: u32, height: u32) -> Result<ContentResponse, RemoteError> {
    Ok(ContentResponse {
        parts: vec![Part::InlineData {
            mime_type: "image/png".to_owned(),
            data: BASE64.encode(png_bytes(width, height)),
        }],
    })
}

pub fn text_response(text: &str) -> Result<ContentResponse, RemoteError> {
    Ok(ContentResponse {
        parts: vec![Part::Text(text.to_owned())],
    })
}

pub fn request_text(request: &ContentRequest) -> &str {
    request
        .parts
        .iter()
        .find_map(|part| match part {
            Part::Text(text) => Some(text.as_str()),
            Part::InlineData { .. } => None,
        })
        .unwrap_or_default()
}
