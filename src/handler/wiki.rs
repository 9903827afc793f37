//! Wiki page handlers
//!
//! One function per [`Action`]. Each runs to completion for a single request
//! and keeps no state between requests.

use std::io::Cursor;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{HeaderMap, Request, Response};
use multer::Multipart;

use crate::config::AppState;
use crate::error::FormError;
use crate::http;
use crate::logger;
use crate::render::Template;
use crate::routing::Action;
use crate::storage::Page;

/// Form field holding the page content
const BODY_FIELD: &str = "body";

/// How the save form body is encoded
#[derive(Debug, PartialEq, Eq)]
enum FormEncoding {
    UrlEncoded,
    Multipart { boundary: String },
}

/// Show a page, or send the client to the editor when it does not exist yet
pub async fn view(state: &AppState, title: &str, is_head: bool) -> Response<Full<Bytes>> {
    match state.store.load(title, state.prefix()).await {
        Ok(page) => render(state, Template::View, &page, is_head),
        Err(_) => http::build_redirect_response(&state.router.link(Action::Edit, title)),
    }
}

/// Show the editor, blank when the page does not exist yet
pub async fn edit(state: &AppState, title: &str, is_head: bool) -> Response<Full<Bytes>> {
    let page = match state.store.load(title, state.prefix()).await {
        Ok(page) => page,
        Err(_) => Page::empty(state.prefix(), title),
    };
    render(state, Template::Edit, &page, is_head)
}

/// Persist the submitted `body` field and redirect to the page view
pub async fn save<B>(state: &AppState, title: &str, req: Request<B>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let encoding = match form_encoding(req.headers()) {
        Ok(encoding) => encoding,
        Err(e) => return form_error_response(title, &e),
    };
    let query = req.uri().query().map(ToString::to_string);
    let limit = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);

    let bytes = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!(
                "Save of '{title}' rejected: body exceeds {limit} bytes"
            ));
            return http::build_413_response();
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return http::build_400_response(&format!("Failed to read request body: {e}"));
        }
    };

    let body = match submitted_body(&encoding, bytes, query.as_deref()).await {
        Ok(body) => body,
        Err(e) => return form_error_response(title, &e),
    };

    let page = Page::new(state.prefix(), title, body.into_bytes());
    match state.store.save(&page).await {
        Ok(()) => http::build_redirect_response(&state.router.link(Action::View, title)),
        Err(e) => {
            logger::log_error(&e.to_string());
            http::build_500_response(&e.to_string())
        }
    }
}

/// Pick the decoder from `Content-Type`. A request without one is read as urlencoded.
fn form_encoding(headers: &HeaderMap) -> Result<FormEncoding, FormError> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Ok(FormEncoding::UrlEncoded);
    };
    let content_type = value.to_str().map_err(|_| {
        FormError::Unsupported(String::from_utf8_lossy(value.as_bytes()).into_owned())
    })?;
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/x-www-form-urlencoded" => Ok(FormEncoding::UrlEncoded),
        "multipart/form-data" => Ok(FormEncoding::Multipart {
            boundary: multer::parse_boundary(content_type)?,
        }),
        _ => Err(FormError::Unsupported(content_type.to_string())),
    }
}

/// The first `body` form field; falls back to the query string, then to empty
async fn submitted_body(
    encoding: &FormEncoding,
    form: Bytes,
    query: Option<&str>,
) -> Result<String, FormError> {
    let from_form = match encoding {
        FormEncoding::UrlEncoded => first_urlencoded(&form)?,
        FormEncoding::Multipart { boundary } => first_multipart(form, boundary).await?,
    };
    if let Some(body) = from_form {
        return Ok(body);
    }
    match query {
        Some(q) => Ok(first_urlencoded(q.as_bytes())?.unwrap_or_default()),
        None => Ok(String::new()),
    }
}

fn first_urlencoded(input: &[u8]) -> Result<Option<String>, serde_urlencoded::de::Error> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(input)?;
    Ok(pairs
        .into_iter()
        .find_map(|(name, value)| (name == BODY_FIELD).then_some(value)))
}

/// First non-file `body` part. Uploaded files are not form values.
async fn first_multipart(form: Bytes, boundary: &str) -> Result<Option<String>, multer::Error> {
    let mut multipart = Multipart::with_reader(Cursor::new(form), boundary);
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(BODY_FIELD) && field.file_name().is_none() {
            return field.text().await.map(Some);
        }
    }
    Ok(None)
}

fn form_error_response(title: &str, error: &FormError) -> Response<Full<Bytes>> {
    logger::log_warning(&format!("Rejected save of '{title}': {error}"));
    match error {
        FormError::Unsupported(_) => http::build_415_response(&error.to_string()),
        _ => http::build_400_response(&format!("Malformed form data: {error}")),
    }
}

fn render(state: &AppState, template: Template, page: &Page, is_head: bool) -> Response<Full<Bytes>> {
    match state.renderer.render(template, page) {
        Ok(content) => http::build_html_response(content, is_head),
        Err(e) => {
            logger::log_error(&format!(
                "Rendering '{}' with template '{}' failed: {e}",
                page.title,
                template.name()
            ));
            http::build_500_response(&e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    async fn urlencoded(form: &str, query: Option<&str>) -> String {
        submitted_body(&FormEncoding::UrlEncoded, Bytes::from(form.to_string()), query)
            .await
            .unwrap()
    }

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_submitted_body_from_form() {
        assert_eq!(urlencoded("body=Hello+wiki%21&other=1", None).await, "Hello wiki!");
    }

    #[tokio::test]
    async fn test_submitted_body_query_fallback() {
        assert_eq!(urlencoded("", Some("body=q")).await, "q");
        assert_eq!(urlencoded("body=f", Some("body=q")).await, "f");
    }

    #[tokio::test]
    async fn test_submitted_body_missing_is_empty() {
        assert_eq!(urlencoded("", None).await, "");
        assert_eq!(urlencoded("title=x", None).await, "");
    }

    #[tokio::test]
    async fn test_submitted_body_keeps_newlines() {
        assert_eq!(urlencoded("body=line1%0D%0Aline2", None).await, "line1\r\nline2");
    }

    #[tokio::test]
    async fn test_repeated_body_field_takes_first() {
        assert_eq!(urlencoded("body=one&body=two", None).await, "one");
        assert_eq!(urlencoded("", Some("body=q1&body=q2")).await, "q1");
    }

    #[tokio::test]
    async fn test_multipart_skips_file_parts() {
        let form = "--X\r\n\
            Content-Disposition: form-data; name=\"body\"; filename=\"a.txt\"\r\n\r\n\
            from file\r\n\
            --X\r\n\
            Content-Disposition: form-data; name=\"body\"\r\n\r\n\
            from field\r\n\
            --X--\r\n";
        let encoding = FormEncoding::Multipart {
            boundary: "X".to_string(),
        };
        let body = submitted_body(&encoding, Bytes::from(form), None).await.unwrap();
        assert_eq!(body, "from field");
    }

    #[test]
    fn test_form_encoding_from_content_type() {
        assert_eq!(form_encoding(&HeaderMap::new()).unwrap(), FormEncoding::UrlEncoded);
        assert_eq!(
            form_encoding(&headers("application/x-www-form-urlencoded; charset=UTF-8")).unwrap(),
            FormEncoding::UrlEncoded
        );
        assert_eq!(
            form_encoding(&headers("multipart/form-data; boundary=abc")).unwrap(),
            FormEncoding::Multipart {
                boundary: "abc".to_string()
            }
        );
        assert!(matches!(
            form_encoding(&headers("text/plain")),
            Err(FormError::Unsupported(ref t)) if t == "text/plain"
        ));
        assert!(matches!(
            form_encoding(&headers("multipart/form-data")),
            Err(FormError::Multipart(_))
        ));
    }
}
