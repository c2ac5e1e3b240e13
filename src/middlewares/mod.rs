use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage, HttpRequest,
};
use futures_util::{future::LocalBoxFuture, FutureExt};
use std::rc::Rc;

use crate::{
    api::error,
    modules::user::{schema::UserRole, service::UserService},
    utils::{Claims, TypeClaims},
    ENV,
};

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let auth = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let token = match auth.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) => t,
        None => {
            return Err(error::Error::unauthorized("Token Invalid or Expired").into());
        }
    };

    let claims = Claims::decode(token, ENV.jwt_secret.as_ref())
        .map_err(|_| error::Error::forbidden("Token Invalid or Expired"))?;

    if claims._type == Some(TypeClaims::RefreshToken) {
        return Err(error::Error::forbidden("Token Invalid or Expired").into());
    }

    let user_service =
        req.app_data::<web::Data<UserService>>().cloned().ok_or(error::Error::InternalServer)?;
    if !user_service.is_active(&claims.sub).await.map_err(error::Error::from)? {
        return Err(error::Error::forbidden("Account is disabled").into());
    }

    req.extensions_mut().insert(claims);

    next.call(req).await
}

pub fn get_extensions<T>(req: &HttpRequest) -> Result<T, error::Error>
where
    T: Clone + 'static,
{
    let extensions = req.extensions();

    let value =
        extensions.get::<T>().ok_or_else(|| error::Error::unauthorized("Unauthorized"))?.clone();

    Ok(value)
}

pub fn get_claims(req: &HttpRequest) -> Result<Claims, error::Error> {
    get_extensions::<Claims>(req)
}

pub fn authorization<B>(
    allowed_roles: Vec<UserRole>,
) -> impl Fn(
    ServiceRequest,
    Next<B>,
) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, actix_web::Error>>
where
    B: MessageBody + 'static,
{
    let allowed_roles = Rc::new(allowed_roles);
    move |req: ServiceRequest, next: Next<B>| {
        let roles = allowed_roles.clone();
        async move {
            let role = get_claims(req.request())?.role;

            if !roles.contains(&role) {
                return Err(error::Error::forbidden("No permission").into());
            }
            next.call(req).await
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::StatusCode,
        middleware::from_fn,
        test::{self, TestRequest},
        App, HttpResponse,
    };
    use std::sync::Arc;

    use super::*;
    use crate::modules::user::service::tests::{service, user_entity, MemoryUserRepo};
    use crate::test::init_test_env;

    async fn whoami(req: HttpRequest) -> Result<HttpResponse, error::Error> {
        let claims = get_claims(&req)?;
        Ok(HttpResponse::Ok().body(claims.sub.to_string()))
    }

    fn bearer(id: &uuid::Uuid, role: UserRole) -> String {
        let token = Claims::new(id, &role, 60).encode(ENV.jwt_secret.as_ref()).unwrap();
        format!("Bearer {token}")
    }

    #[actix_web::test]
    async fn admin_scope_rejects_plain_users_and_disabled_admins() {
        init_test_env();
        let admin = user_entity("admin", UserRole::Admin, true);
        let user = user_entity("user", UserRole::User, true);
        let disabled = user_entity("former", UserRole::Admin, false);
        let (admin_id, user_id, disabled_id) = (admin.id, user.id, disabled.id);
        let users = service(Arc::new(MemoryUserRepo::with(vec![admin, user, disabled])));

        let app = test::init_service(
            App::new().app_data(web::Data::new(users)).service(
                web::scope("/admin")
                    .wrap(from_fn(authorization(vec![UserRole::Owner, UserRole::Admin])))
                    .wrap(from_fn(authentication))
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let req = TestRequest::get()
            .uri("/admin/me")
            .insert_header(("Authorization", bearer(&admin_id, UserRole::Admin)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, admin_id.to_string());

        for (id, role) in [(user_id, UserRole::User), (disabled_id, UserRole::Admin)] {
            let req = TestRequest::get()
                .uri("/admin/me")
                .insert_header(("Authorization", bearer(&id, role)))
                .to_request();
            let status = match test::try_call_service(&app, req).await {
                Ok(resp) => resp.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            assert_eq!(status, StatusCode::FORBIDDEN);
        }
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        init_test_env();
        let users = service(Arc::new(MemoryUserRepo::default()));
        let app = test::init_service(
            App::new().app_data(web::Data::new(users)).service(
                web::scope("/me").wrap(from_fn(authentication)).route("", web::get().to(whoami)),
            ),
        )
        .await;

        let req = TestRequest::get().uri("/me").to_request();
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let req = TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
