//! REST verb routing with conditional-GET caching.
//!
//! A REST controller maps the HTTP method and the presence of a trailing id
//! segment onto resource operations:
//!
//! ```text
//! GET    /controller    -> list()
//! POST   /controller    -> create()
//! GET    /controller/id -> get(id)
//! DELETE /controller/id -> delete(id)
//! PUT    /controller/id -> update(id)
//! ```
//!
//! Every verb method defaults to method-not-allowed; implementors override
//! only what they support. JSON-able results flow through the ETag/caching
//! layer; pre-built responses pass through unchanged.

use serde::Serialize;
use serde_json::Value;

use crate::caching::{self, CachePolicy};
use crate::error::Error;
use crate::http::{Method, Request, Response};

/// The result of a REST verb method.
#[derive(Debug)]
pub enum RestOutcome {
    /// A JSON value to serialize through the caching layer. `Value::Null`
    /// stands for an intentionally empty body, which then requires the
    /// handler to have supplied an ETag by other means.
    Body(Value),
    /// A finished response, passed through without caching treatment.
    Raw(Response),
}

impl RestOutcome {
    /// Encodes any serializable value as a JSON body.
    pub fn json<T: Serialize>(value: T) -> Result<Self, Error> {
        Ok(Self::Body(serde_json::to_value(value)?))
    }
}

/// A RESTful resource controller.
///
/// The five verb methods default to [`Error::MethodNotAllowed`]; override
/// them selectively. [`cache_policy`](Self::cache_policy) configures how
/// JSON responses may be cached.
pub trait RestHandler: Send + Sync {
    /// `GET /controller` — the collection listing.
    fn list(&self, _request: &Request) -> Result<RestOutcome, Error> {
        Err(Error::MethodNotAllowed)
    }

    /// `POST /controller` — create a resource in the collection.
    fn create(&self, _request: &Request) -> Result<RestOutcome, Error> {
        Err(Error::MethodNotAllowed)
    }

    /// `GET /controller/id` — fetch one resource.
    fn get(&self, _request: &Request, _id: &str) -> Result<RestOutcome, Error> {
        Err(Error::MethodNotAllowed)
    }

    /// `PUT /controller/id` — replace one resource.
    fn update(&self, _request: &Request, _id: &str) -> Result<RestOutcome, Error> {
        Err(Error::MethodNotAllowed)
    }

    /// `DELETE /controller/id` — remove one resource.
    fn delete(&self, _request: &Request, _id: &str) -> Result<RestOutcome, Error> {
        Err(Error::MethodNotAllowed)
    }

    /// The caching policy applied to JSON responses.
    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::ConditionalGet
    }
}

/// Routes `request` to the matching verb method and renders the outcome.
///
/// `id` is the path remainder, present for resource-level operations and
/// absent for collection-level ones. Unsupported combinations — POST to a
/// resource, PUT or DELETE without an id, unrecognized methods — fail with
/// method-not-allowed before the handler is consulted.
pub fn dispatch(
    version: &str,
    handler: &dyn RestHandler,
    request: &Request,
    id: Option<&str>,
) -> Result<Response, Error> {
    let outcome = match (request.method(), id) {
        (Method::Get, None) => handler.list(request)?,
        (Method::Get, Some(id)) => handler.get(request, id)?,
        (Method::Post, None) => handler.create(request)?,
        (Method::Post, Some(_)) => return Err(Error::MethodNotAllowed),
        (Method::Put, Some(id)) => handler.update(request, id)?,
        (Method::Delete, Some(id)) => handler.delete(request, id)?,
        _ => return Err(Error::MethodNotAllowed),
    };

    match outcome {
        RestOutcome::Body(value) => {
            let data = if value.is_null() { None } else { Some(&value) };
            caching::build_response(version, request, data, None, handler.cache_policy())
        }
        RestOutcome::Raw(response) => Ok(response),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::caching::{compute_etag, quote_etag};
    use crate::http::StatusCode;

    fn request(method: &str, headers: &[(&str, &str)]) -> Request {
        let mut raw = format!("{method} /api/artists HTTP/1.1\r\nHost: localhost\r\n");
        for (name, value) in headers {
            raw.push_str(&format!("{name}: {value}\r\n"));
        }
        raw.push_str("\r\n");
        let (req, _) = Request::parse(raw.as_bytes()).unwrap();
        req
    }

    struct NothingAllowed;

    impl RestHandler for NothingAllowed {}

    struct Recorder;

    impl RestHandler for Recorder {
        fn list(&self, _request: &Request) -> Result<RestOutcome, Error> {
            RestOutcome::json(json!({"method": "list"}))
        }

        fn create(&self, _request: &Request) -> Result<RestOutcome, Error> {
            RestOutcome::json(json!({"method": "create"}))
        }

        fn get(&self, _request: &Request, id: &str) -> Result<RestOutcome, Error> {
            RestOutcome::json(json!({"method": "get", "id": id}))
        }

        fn update(&self, _request: &Request, id: &str) -> Result<RestOutcome, Error> {
            RestOutcome::json(json!({"method": "update", "id": id}))
        }

        fn delete(&self, _request: &Request, id: &str) -> Result<RestOutcome, Error> {
            RestOutcome::json(json!({"method": "delete", "id": id}))
        }
    }

    fn body_json(resp: Response) -> Value {
        serde_json::from_slice(resp.body_ref()).unwrap()
    }

    #[test]
    fn verb_table_maps_to_methods() {
        let checks = [
            ("GET", None, json!({"method": "list"})),
            ("GET", Some("test"), json!({"method": "get", "id": "test"})),
            ("POST", None, json!({"method": "create"})),
            (
                "DELETE",
                Some("test"),
                json!({"method": "delete", "id": "test"}),
            ),
            (
                "PUT",
                Some("test"),
                json!({"method": "update", "id": "test"}),
            ),
        ];
        for (method, id, expected) in checks {
            let resp = dispatch("1.2", &Recorder, &request(method, &[]), id).unwrap();
            assert_eq!(resp.status(), StatusCode::Ok, "{method} {id:?}");
            assert_eq!(body_json(resp), expected, "{method} {id:?}");
        }
    }

    #[test]
    fn post_to_resource_is_not_allowed() {
        // POST is only allowed on collections
        let err = dispatch("1.2", &Recorder, &request("POST", &[]), Some("test")).unwrap_err();
        assert!(matches!(err, Error::MethodNotAllowed));
    }

    #[test]
    fn put_without_id_is_not_allowed() {
        let err = dispatch("1.2", &Recorder, &request("PUT", &[]), None).unwrap_err();
        assert!(matches!(err, Error::MethodNotAllowed));
    }

    #[test]
    fn delete_without_id_is_not_allowed() {
        let err = dispatch("1.2", &Recorder, &request("DELETE", &[]), None).unwrap_err();
        assert!(matches!(err, Error::MethodNotAllowed));
    }

    #[test]
    fn unrecognized_method_is_not_allowed() {
        let err = dispatch("1.2", &Recorder, &request("CARROT", &[]), None).unwrap_err();
        assert!(matches!(err, Error::MethodNotAllowed));
    }

    #[test]
    fn all_verbs_default_to_not_allowed() {
        let checks = [
            ("GET", None),
            ("GET", Some("test")),
            ("POST", None),
            ("DELETE", Some("test")),
            ("PUT", Some("test")),
            ("CARROT", None),
        ];
        for (method, id) in checks {
            let err = dispatch("1.2", &NothingAllowed, &request(method, &[]), id).unwrap_err();
            assert!(matches!(err, Error::MethodNotAllowed), "{method} {id:?}");
        }
    }

    #[test]
    fn json_response_carries_etag_and_policy() {
        let resp = dispatch("1.2", &Recorder, &request("GET", &[]), None).unwrap();
        assert_eq!(resp.headers().get("content-type"), Some("application/json"));
        assert_eq!(resp.headers().get("cache-control"), Some("must-revalidate"));
        let expected = quote_etag(&compute_etag("1.2", &[json!({"method": "list"})]));
        assert_eq!(resp.headers().get("etag"), Some(expected.as_str()));
    }

    #[test]
    fn matching_etag_short_circuits_to_304() {
        let etag = quote_etag(&compute_etag(
            "1.2",
            &[json!({"method": "get", "id": "7"})],
        ));
        let req = request("GET", &[("If-None-Match", &etag)]);
        let resp = dispatch("1.2", &Recorder, &req, Some("7")).unwrap();
        assert_eq!(resp.status(), StatusCode::NotModified);
        assert!(resp.body_ref().is_empty());
        assert_eq!(resp.headers().get("etag"), Some(etag.as_str()));
    }

    #[test]
    fn raw_outcome_bypasses_caching() {
        struct Passthrough;

        impl RestHandler for Passthrough {
            fn get(&self, _request: &Request, _id: &str) -> Result<RestOutcome, Error> {
                Ok(RestOutcome::Raw(
                    Response::new(StatusCode::NoContent).header("X-Custom", "yes"),
                ))
            }
        }

        let resp = dispatch("1.2", &Passthrough, &request("GET", &[]), Some("x")).unwrap();
        assert_eq!(resp.status(), StatusCode::NoContent);
        assert!(!resp.headers().contains("etag"));
        assert!(!resp.headers().contains("cache-control"));
    }

    #[test]
    fn null_body_without_etag_is_a_contract_violation() {
        struct NullBody;

        impl RestHandler for NullBody {
            fn get(&self, _request: &Request, _id: &str) -> Result<RestOutcome, Error> {
                Ok(RestOutcome::Body(Value::Null))
            }
        }

        let err = dispatch("1.2", &NullBody, &request("GET", &[]), Some("x")).unwrap_err();
        assert!(matches!(err, Error::MissingEtag));
    }

    #[test]
    fn no_store_policy_is_respected() {
        struct Sensitive;

        impl RestHandler for Sensitive {
            fn list(&self, _request: &Request) -> Result<RestOutcome, Error> {
                RestOutcome::json(json!(["secret"]))
            }

            fn cache_policy(&self) -> CachePolicy {
                CachePolicy::NoStore
            }
        }

        let resp = dispatch("1.2", &Sensitive, &request("GET", &[]), None).unwrap();
        assert_eq!(resp.headers().get("cache-control"), Some("no-store"));
    }
}
