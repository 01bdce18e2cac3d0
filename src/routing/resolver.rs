//! Path-to-route resolution.
//!
//! Splits a raw request path into `(module, controller, remainder)` per the
//! fixed convention. Resolution never fails: a malformed path simply yields
//! names that miss in the registry downstream.

/// The outcome of resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The path carried one or more trailing slashes; the client must be
    /// redirected (302) to the stripped path (or the root, for slash-only
    /// paths). The target itself never redirects, so a single hop suffices.
    Redirect(String),
    /// The resolved route. `remainder` is empty or the unsplit tail,
    /// which may itself contain slashes.
    Route {
        module: String,
        controller: String,
        remainder: String,
    },
}

/// Resolves `path` into a [`Resolution`].
///
/// Splitting uses a "split on slash, max 3 cuts" rule, so the remainder is
/// never subdivided:
///
/// - `/wiki` → `(wiki, index, "")`
/// - `/wiki/list` → `(wiki, list, "")`
/// - `/wiki/page/45/edit` → `(wiki, page, "45/edit")`
/// - `/` → `(index, index, "")`
pub fn resolve(path: &str) -> Resolution {
    // No extra trailing slashes allowed
    if path != "/" && path.ends_with('/') {
        let stripped = path.trim_end_matches('/');
        // A slash-only path strips to nothing; send the client to the root.
        let target = if stripped.is_empty() { "/" } else { stripped };
        return Resolution::Redirect(target.to_owned());
    }

    let request_path = format!("/{}", path.trim_start_matches('/'));
    let parts: Vec<&str> = request_path.splitn(4, '/').collect();

    let (module, controller, remainder) = match parts.as_slice() {
        [_, module] => (*module, "index", ""),
        [_, module, controller] => (*module, *controller, ""),
        [_, module, controller, remainder] => (*module, *controller, *remainder),
        // splitn on a string starting with '/' always yields at least two parts
        _ => ("", "index", ""),
    };

    // Root level access falls through to the index module
    let module = if module.is_empty() { "index" } else { module };

    Resolution::Route {
        module: module.to_owned(),
        controller: controller.to_owned(),
        remainder: remainder.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str) -> (String, String, String) {
        match resolve(path) {
            Resolution::Route {
                module,
                controller,
                remainder,
            } => (module, controller, remainder),
            Resolution::Redirect(to) => panic!("unexpected redirect to {to:?}"),
        }
    }

    #[test]
    fn root_resolves_to_index_index() {
        assert_eq!(route("/"), ("index".into(), "index".into(), String::new()));
    }

    #[test]
    fn single_segment_uses_index_controller() {
        assert_eq!(route("/wiki"), ("wiki".into(), "index".into(), String::new()));
    }

    #[test]
    fn two_segments_name_the_controller() {
        assert_eq!(route("/wiki/list"), ("wiki".into(), "list".into(), String::new()));
    }

    #[test]
    fn third_segment_becomes_remainder() {
        assert_eq!(
            route("/mod/ctl/extra"),
            ("mod".into(), "ctl".into(), "extra".into())
        );
    }

    #[test]
    fn remainder_is_never_subdivided() {
        assert_eq!(
            route("/wiki/page/45/edit"),
            ("wiki".into(), "page".into(), "45/edit".into())
        );
    }

    #[test]
    fn trailing_slash_redirects_to_stripped_path() {
        assert_eq!(
            resolve("/hello/world/"),
            Resolution::Redirect("/hello/world".into())
        );
    }

    #[test]
    fn multiple_trailing_slashes_strip_in_one_hop() {
        assert_eq!(resolve("/wiki///"), Resolution::Redirect("/wiki".into()));
    }

    #[test]
    fn slash_only_path_redirects_to_root() {
        assert_eq!(resolve("//"), Resolution::Redirect("/".into()));
        assert_eq!(resolve("///"), Resolution::Redirect("/".into()));
    }

    #[test]
    fn root_never_redirects() {
        assert_eq!(route("/"), ("index".into(), "index".into(), String::new()));
    }

    #[test]
    fn doubled_leading_slash_is_tolerated() {
        assert_eq!(route("//wiki"), ("wiki".into(), "index".into(), String::new()));
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(route("/Wiki/Page"), ("Wiki".into(), "Page".into(), String::new()));
    }
}
