//! Request plumbing shared by the route handlers: extractors that keep
//! rejections inside the error envelope, plus field validation helpers.

pub mod extract;
pub mod fields;

pub use extract::{JsonBody, QueryParams, ResourceId};
pub use fields::{optional_text, parse_field, require, require_text};

use serde::Serialize;
use serde_json::{json, Value};

use crate::database::Page;

/// Renders a page as `{ <key>: [...], total, page, per_page, pages }`
pub fn paginated<T: Serialize>(key: &str, page: Page<T>) -> Value {
    let mut body = json!({
        "total": page.total,
        "page": page.page,
        "per_page": page.per_page,
        "pages": page.pages,
    });
    body[key] = json!(page.items);
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::PageRequest;

    #[test]
    fn paginated_uses_resource_key() {
        let page = Page::new(vec![1, 2], 2, PageRequest { page: 1, per_page: 20 });
        let body = paginated("campaigns", page);
        assert_eq!(body["campaigns"], json!([1, 2]));
        assert_eq!(body["total"], 2);
        assert_eq!(body["pages"], 1);
    }
}
