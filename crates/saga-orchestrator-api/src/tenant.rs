//! Ingress header extraction for tenant/world scoping (§6.3).

use actix_web::HttpRequest;

/// The tenant/world/version context every ingress request carries. Read requests
/// use `tenant_id` to scope which sagas they can see; the other fields are carried
/// through for parity with the rest of the platform but aren't interpreted here.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub tenant_id: String,
    pub region: Option<String>,
    pub major_version: Option<String>,
    pub minor_version: Option<String>,
}

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers().get(name)?.to_str().ok().map(str::to_string)
}

impl RequestContext {
    pub fn from_request(req: &HttpRequest) -> Self {
        Self {
            tenant_id: header(req, "TENANT_ID").unwrap_or_else(|| "default".to_string()),
            region: header(req, "REGION"),
            major_version: header(req, "MAJOR_VERSION"),
            minor_version: header(req, "MINOR_VERSION"),
        }
    }
}
