/// Authentication Routes
///
/// Login, signup, password restore and the two read-only validity probes.
/// Handlers only translate between HTTP and the service layer; the restore
/// handler classifies the request before the orchestrator sees it.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::accounts::AccountService;
use crate::auth::Claims;
use crate::error::{AppError, ValidationError};
use crate::middleware::bearer_token;
use crate::restore::{RestoreOrchestrator, RestoreOutcome, RestoreRequest};

/// Login and signup request
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Restore request body. Which fields are required depends on the path the
/// request is classified into.
#[derive(Deserialize, Default)]
pub struct RestoreBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct TokenValidRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Deserialize)]
pub struct CodeValidRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

/// Every success body carries its HTTP status in `code`.
#[derive(Serialize)]
pub struct TokenResponse {
    pub code: u16,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct RestoreResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Serialize)]
pub struct ValidResponse {
    pub code: u16,
    pub valid: bool,
}

#[derive(Serialize)]
pub struct IdentityResponse {
    pub code: u16,
    pub email: String,
}

/// POST /auth/login
///
/// # Errors
/// - 400: email or password missing
/// - 401: unknown email or wrong password (indistinguishable)
pub async fn login(
    form: web::Json<CredentialsRequest>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let token = accounts.login(&form.email, &form.password).await?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        code: 200,
        token,
        token_type: "Bearer".to_string(),
        expires_in: accounts.token_expiry_seconds(),
    }))
}

/// POST /auth/signup
///
/// # Errors
/// - 400: invalid email format or unusable password
/// - 409: email already registered
pub async fn signup(
    form: web::Json<CredentialsRequest>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let token = accounts.signup(&form.email, &form.password).await?;

    Ok(HttpResponse::Created().json(TokenResponse {
        code: 201,
        token,
        token_type: "Bearer".to_string(),
        expires_in: accounts.token_expiry_seconds(),
    }))
}

/// Map an inbound restore call onto one of the three restore requests.
///
/// A bearer header always selects the authenticated path, even when the
/// token turns out to be invalid, so a bad token is never silently retried
/// as a code request.
pub fn classify_restore(req: &HttpRequest, body: RestoreBody) -> RestoreRequest {
    if let Some(token) = bearer_token(req.headers()) {
        return RestoreRequest::Authenticated {
            token,
            old_secret: body.old_password,
            new_secret: body.new_password,
        };
    }

    if body.code.is_empty() {
        RestoreRequest::RequestCode {
            identity: body.email,
        }
    } else {
        RestoreRequest::RedeemCode {
            identity: body.email,
            code: body.code,
            old_secret: body.old_password,
            new_secret: body.new_password,
        }
    }
}

/// PUT /auth/restore
///
/// - 202: restore code issued (delivery happens in the background)
/// - 200: password changed
///
/// # Errors
/// - 400: missing fields, unknown email, invalid code
/// - 401: invalid bearer token or wrong old password
pub async fn restore(
    req: HttpRequest,
    body: web::Json<RestoreBody>,
    orchestrator: web::Data<RestoreOrchestrator>,
) -> Result<HttpResponse, AppError> {
    let request = classify_restore(&req, body.into_inner());

    let outcome = orchestrator.restore(request).await?;

    Ok(match outcome {
        RestoreOutcome::CodeIssued => HttpResponse::Accepted().json(RestoreResponse {
            code: 202,
            message: "restore code sent".to_string(),
        }),
        RestoreOutcome::PasswordChanged => HttpResponse::Ok().json(RestoreResponse {
            code: 200,
            message: "password changed".to_string(),
        }),
    })
}

/// POST /auth/valid
pub async fn token_valid(
    form: web::Json<TokenValidRequest>,
    orchestrator: web::Data<RestoreOrchestrator>,
) -> Result<HttpResponse, AppError> {
    if form.token.is_empty() {
        return Err(ValidationError::EmptyField("token".to_string()).into());
    }

    Ok(HttpResponse::Ok().json(ValidResponse {
        code: 200,
        valid: orchestrator.token_valid(&form.token),
    }))
}

/// POST /auth/restore/valid
pub async fn code_valid(
    form: web::Json<CodeValidRequest>,
    orchestrator: web::Data<RestoreOrchestrator>,
) -> Result<HttpResponse, AppError> {
    if form.code.is_empty() || form.email.trim().is_empty() {
        return Err(ValidationError::EmptyField("code or email".to_string()).into());
    }

    Ok(HttpResponse::Ok().json(ValidResponse {
        code: 200,
        valid: orchestrator.code_valid(&form.email, &form.code),
    }))
}

/// GET /api/me
///
/// Requires `Authorization: Bearer <token>`; claims are injected by
/// `BearerAuth`.
pub async fn whoami(claims: web::ReqData<Claims>) -> HttpResponse {
    HttpResponse::Ok().json(IdentityResponse {
        code: 200,
        email: claims.identity().to_string(),
    })
}

/// Turn JSON extraction failures into the service's 400 response.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    tracing::warn!(error = %err, "Rejected request body");
    AppError::Validation(ValidationError::InvalidFormat("request body".to_string())).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn body(email: &str, code: &str) -> RestoreBody {
        RestoreBody {
            email: email.to_string(),
            code: code.to_string(),
            old_password: "old".to_string(),
            new_password: "new".to_string(),
        }
    }

    #[test]
    fn test_bearer_header_selects_authenticated_path() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc"))
            .to_http_request();

        match classify_restore(&req, body("a@b.com", "code")) {
            RestoreRequest::Authenticated { token, .. } => assert_eq!(token, "abc"),
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_code_selects_redeem_path() {
        let req = TestRequest::default().to_http_request();

        match classify_restore(&req, body("a@b.com", "code")) {
            RestoreRequest::RedeemCode { identity, code, .. } => {
                assert_eq!(identity, "a@b.com");
                assert_eq!(code, "code");
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_no_code_selects_request_path() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic abc"))
            .to_http_request();

        assert!(matches!(
            classify_restore(&req, body("a@b.com", "")),
            RestoreRequest::RequestCode { .. }
        ));
    }
}
