/// Prefix applied to operation ids that would otherwise not start with a letter.
pub const OPERATION_ID_PREFIX: &str = "op_";

/// Check that a route is safe to publish as an OpenAPI path.
///
/// Routes must start with `/` and may only contain ASCII alphanumerics,
/// spaces and `/ { } - _ . ~`. Any `..` sequence is rejected.
pub fn validate_route_path(route: &str) -> bool {
    if !route.starts_with('/') || route.contains("..") {
        return false;
    }
    route.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '/' | '{' | '}' | '-' | '_' | '.' | '~' | ' ')
    })
}

/// Reduce an operation id to `[A-Za-z][A-Za-z0-9_]*`.
///
/// Disallowed characters are dropped and ids that do not start with a
/// letter get [`OPERATION_ID_PREFIX`]. Returns an empty string when nothing
/// usable is left.
pub fn sanitize_operation_id(operation_id: &str) -> String {
    let kept: String = operation_id
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect();

    match kept.chars().next() {
        None => String::new(),
        Some(first) if first.is_ascii_alphabetic() => kept,
        Some(_) => format!("{OPERATION_ID_PREFIX}{kept}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_routes() {
        for route in [
            "/",
            "/api/test",
            "/users/{id}",
            "/api/v1/users/{user_id}/posts/{post_id}",
            "/api/test-with-hyphens",
            "/api/test_with_underscores",
            "/api/test with spaces",
            "/api/v1.2/items",
        ] {
            assert!(validate_route_path(route), "{route} should be valid");
        }
        let long_route = format!("/{}", "a".repeat(1000));
        assert!(validate_route_path(&long_route));
    }

    #[test]
    fn rejects_unsafe_routes() {
        for route in [
            "",
            "not_starting_with_slash",
            "/api/../test",
            "/api/..\\test",
            "/api/<script>alert('xss')</script>",
            "/api/<SCRIPT>alert('xss')</SCRIPT>",
            "/api/javascript:alert('xss')",
            "/api/JAVASCRIPT:alert('xss')",
            "/api/data:text/html,<script>alert('xss')</script>",
            "/api/test?param=<script>",
            "/api/test#<script>",
            "/api/test@#$%",
        ] {
            assert!(!validate_route_path(route), "{route} should be invalid");
        }
    }

    #[test]
    fn keeps_valid_operation_ids() {
        for id in ["getUser", "create_user", "test123", "a", "get_user_by_id"] {
            assert_eq!(sanitize_operation_id(id), id);
        }
    }

    #[test]
    fn strips_disallowed_characters() {
        for input in [
            "get-user", "get.user", "get user", "get@user", "get#user", "get$user", "get%user",
            "get&user", "get*user", "get+user", "get=user", "get?user", "get!user", "get^user",
            "get~user", "get`user", "get|user", "get\\user", "get/user", "get<user", "get>user",
            "get[user", "get]user", "get{user", "get}user", "get(user", "get)user",
        ] {
            assert_eq!(sanitize_operation_id(input), "getuser", "{input}");
        }
        assert_eq!(sanitize_operation_id("Get-User@123"), "GetUser123");
        assert_eq!(sanitize_operation_id("getÜser"), "getser");
    }

    #[test]
    fn prefixes_ids_not_starting_with_a_letter() {
        assert_eq!(sanitize_operation_id("123getUser"), "op_123getUser");
        assert_eq!(sanitize_operation_id("9test"), "op_9test");
        assert_eq!(sanitize_operation_id("123456"), "op_123456");
        assert_eq!(sanitize_operation_id("_private"), "op__private");
    }

    #[test]
    fn empty_when_nothing_survives() {
        assert_eq!(sanitize_operation_id(""), "");
        assert_eq!(sanitize_operation_id("!@#$%^&*()"), "");
    }
}
