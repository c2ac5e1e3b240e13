use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse};
use futures_util::TryStreamExt;
use uuid::Uuid;

use crate::api::{error, success};
use crate::modules::media::{
    model::{ArrangePhotosModel, IncomingImage},
    service::MediaService,
};
use crate::modules::property::model::PhotoList;
use crate::utils::ValidatedJson;

/// Accepts any number of file fields plus an optional `alt_text` text field.
#[post("/{property_id:[0-9a-fA-F-]{36}}")]
pub async fn upload_photos(
    mut payload: Multipart,
    property_id: web::Path<Uuid>,
    media_service: web::Data<MediaService>,
) -> Result<success::Success<PhotoList>, error::Error> {
    let max_size = media_service.max_file_size();
    let max_files = media_service.max_files();
    let mut files = Vec::new();
    let mut alt_text = None;

    while let Some(mut field) =
        payload.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
    {
        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| error::Error::bad_request("Missing content disposition"))?;
        let filename = content_disposition.get_filename().map(str::to_string);
        let name = content_disposition.get_name().unwrap_or_default().to_string();
        if filename.is_some() && files.len() >= max_files {
            return Err(error::Error::bad_request(format!(
                "At most {max_files} files can be uploaded at once"
            )));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) =
            field.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
        {
            if bytes.len() + chunk.len() > max_size {
                return Err(error::Error::bad_request(format!(
                    "File size exceeds maximum allowed size of {} bytes",
                    max_size
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match filename {
            Some(original_filename) => files.push(IncomingImage { original_filename, bytes }),
            None if name == "alt_text" => {
                let text = String::from_utf8(bytes)
                    .map_err(|_| error::Error::bad_request("alt_text must be UTF-8"))?;
                alt_text = Some(text.trim().to_string()).filter(|t| !t.is_empty());
            }
            None => {}
        }
    }

    let count = files.len();
    let list = media_service.upload_photos(property_id.into_inner(), files, alt_text).await?;
    Ok(success::Success::created(Some(list)).message(format!("{count} photo(s) uploaded")))
}

#[delete("/{property_id:[0-9a-fA-F-]{36}}/{filename}")]
pub async fn delete_photo(
    path: web::Path<(Uuid, String)>,
    media_service: web::Data<MediaService>,
) -> Result<success::Success<PhotoList>, error::Error> {
    let (property_id, filename) = path.into_inner();
    let list = media_service.delete_photo(property_id, &filename).await?;
    Ok(success::Success::ok(Some(list)).message("Photo deleted successfully"))
}

#[put("/{property_id:[0-9a-fA-F-]{36}}")]
pub async fn arrange_photos(
    property_id: web::Path<Uuid>,
    body: ValidatedJson<ArrangePhotosModel>,
    media_service: web::Data<MediaService>,
) -> Result<success::Success<PhotoList>, error::Error> {
    let list = media_service.arrange_photos(property_id.into_inner(), body.0.photos).await?;
    Ok(success::Success::ok(Some(list)).message("Photos updated successfully"))
}

#[get("/{filename}")]
pub async fn serve_image(
    filename: web::Path<String>,
    media_service: web::Data<MediaService>,
) -> Result<HttpResponse, error::Error> {
    let (bytes, mime) = media_service.read_image(&filename).await?;
    Ok(HttpResponse::Ok()
        .content_type(mime)
        .insert_header(("Cache-Control", "public, max-age=86400"))
        .body(bytes))
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::StatusCode,
        test::{self, TestRequest},
        App,
    };

    use super::*;
    use crate::modules::media::{
        model::UploadConfig,
        service::tests::{service_with, PNG},
        storage::list_files,
    };
    use crate::modules::property::schema::PropertyStatus;
    use crate::modules::property::service::tests::entity;

    const BOUNDARY: &str = "estate-boundary";

    fn multipart(names: &[&str]) -> Vec<u8> {
        let mut body = Vec::new();
        for name in names {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(PNG);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    #[actix_web::test]
    async fn upload_stops_at_the_file_limit() {
        let row = entity("Villa", PropertyStatus::Published);
        let id = row.id;
        let config = UploadConfig { max_files: 1, ..UploadConfig::default() };
        let (dir, repo, media_service) = service_with(vec![row], config).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(media_service))
                .service(web::scope("/photos").service(upload_photos)),
        )
        .await;

        let req = TestRequest::post()
            .uri(&format!("/photos/{id}"))
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart(&["a.png", "b.png"]))
            .to_request();
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(list_files(&dir.path().join("uploads")).await.unwrap().is_empty());
        assert!(repo.rows.lock().unwrap()[&id].photos.0.is_empty());

        let req = TestRequest::post()
            .uri(&format!("/photos/{id}"))
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart(&["a.png"]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(repo.rows.lock().unwrap()[&id].photos.0.len(), 1);
    }
}
