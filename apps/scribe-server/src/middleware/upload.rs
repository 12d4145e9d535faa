//! Post form extractor accepting urlencoded or multipart bodies.

use actix_multipart::Multipart;
use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::StreamExt;
use futures::future::LocalBoxFuture;

use scribe_core::forms::{MAX_IMAGE_BYTES, PostForm};
use scribe_core::ports::ImageUpload;

/// A submitted post form plus its image upload, if any.
///
/// Uploads larger than the limit are cut off one byte past it so validation
/// still sees them as oversized.
#[derive(Debug, Default)]
pub struct PostSubmission {
    pub form: PostForm,
    pub upload: Option<ImageUpload>,
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

async fn read_multipart(mut multipart: Multipart) -> Result<PostSubmission, actix_web::Error> {
    let mut submission = PostSubmission::default();

    while let Some(field) = multipart.next().await {
        let mut field = field?;
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let limit = if name == "image" {
            MAX_IMAGE_BYTES + 1
        } else {
            MAX_IMAGE_BYTES
        };
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            let room = limit.saturating_sub(bytes.len());
            bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }

        match name.as_str() {
            "text" => submission.form.text = String::from_utf8_lossy(&bytes).into_owned(),
            "group" => submission.form.group = Some(String::from_utf8_lossy(&bytes).into_owned()),
            // A file input left empty still sends the part, with no filename.
            "image" if !bytes.is_empty() => {
                submission.upload = Some(ImageUpload {
                    filename: filename.unwrap_or_default(),
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok(submission)
}

impl FromRequest for PostSubmission {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if is_multipart(req) {
            let multipart = Multipart::new(req.headers(), payload.take());
            Box::pin(read_multipart(multipart))
        } else {
            let form = web::Form::<PostForm>::from_request(req, payload);
            Box::pin(async move {
                let web::Form(form) = form.await?;
                Ok(PostSubmission { form, upload: None })
            })
        }
    }
}
