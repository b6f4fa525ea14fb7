use axum::body::Body;
use axum::http::{Method, Request};

/// Rewrites `POST /path?_method=PUT` into a real PUT (and likewise DELETE)
/// so HTML forms can reach the full route table. Must wrap the router from
/// the outside: middleware added with `Router::layer` runs after routing and
/// could no longer influence which route matches.
pub fn rewrite(mut request: Request<Body>) -> Request<Body> {
    if request.method() == Method::POST {
        if let Some(method) = request.uri().query().and_then(override_param) {
            *request.method_mut() = method;
        }
    }
    request
}

fn override_param(query: &str) -> Option<Method> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("_method="))
        .and_then(|value| match value.to_ascii_uppercase().as_str() {
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_rewrites_put_and_delete() {
        let put = rewrite(request(Method::POST, "/events/1?_method=PUT"));
        assert_eq!(put.method(), Method::PUT);

        let delete = rewrite(request(Method::POST, "/attendees/1?_method=delete"));
        assert_eq!(delete.method(), Method::DELETE);
    }

    #[test]
    fn test_ignores_other_methods_and_values() {
        let patch = rewrite(request(Method::POST, "/events/1?_method=PATCH"));
        assert_eq!(patch.method(), Method::POST);

        let get = rewrite(request(Method::GET, "/events/1?_method=PUT"));
        assert_eq!(get.method(), Method::GET);

        let plain = rewrite(request(Method::POST, "/events/1"));
        assert_eq!(plain.method(), Method::POST);
    }

    #[test]
    fn test_finds_param_among_others() {
        let req = rewrite(request(Method::POST, "/events/1?from=list&_method=PUT"));
        assert_eq!(req.method(), Method::PUT);
    }
}
