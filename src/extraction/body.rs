//! Posting body and notices

use scraper::ElementRef;

use super::anchors::require;
use super::navigator::{AttrFilter, Navigate};
use crate::error::{Anchor, StructuralError};

/// Full text of `section#postingbody`, including any nested markup text.
///
/// # Errors
///
/// [`Anchor::PostingBody`] when the section is missing.
pub fn post_text(user_body: ElementRef<'_>) -> Result<String, StructuralError> {
    let body = require(
        user_body.find("section", AttrFilter::Id("postingbody")),
        Anchor::PostingBody,
    )?;
    Ok(body.rendered_text())
}

/// Text of each `<li>` in `ul.notices`, in order. An empty list is valid.
///
/// # Errors
///
/// [`Anchor::Notices`] when the list element itself is missing.
pub fn notices(user_body: ElementRef<'_>) -> Result<Vec<String>, StructuralError> {
    let list = require(
        user_body.find("ul", AttrFilter::Class("notices")),
        Anchor::Notices,
    )?;
    Ok(list
        .find_all("li", AttrFilter::Any)
        .into_iter()
        .map(|li| li.rendered_text())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::navigator::root;
    use scraper::Html;

    const USER_BODY: &str = r#"<section class="userbody">
        <section id="postingbody"><div class="print-qrcode-container">QR Code Link to This Post</div>
great bike, runs well</section>
        <ul class="notices"><li>do NOT contact me with unsolicited services or offers</li><li>second</li></ul>
    </section>"#;

    #[test]
    fn test_post_text_includes_nested_text() {
        let doc = Html::parse_document(USER_BODY);
        let user_body = root(&doc).find("section", AttrFilter::Class("userbody")).unwrap();
        let text = post_text(user_body).unwrap();
        assert!(text.contains("QR Code Link to This Post"));
        assert!(text.ends_with("great bike, runs well"));
    }

    #[test]
    fn test_notices_in_order() {
        let doc = Html::parse_document(USER_BODY);
        let user_body = root(&doc).find("section", AttrFilter::Class("userbody")).unwrap();
        assert_eq!(
            notices(user_body).unwrap(),
            vec![
                "do NOT contact me with unsolicited services or offers".to_string(),
                "second".to_string()
            ]
        );
    }

    #[test]
    fn test_empty_notices_list_is_valid() {
        let doc = Html::parse_document(r#"<section class="userbody"><ul class="notices"></ul></section>"#);
        let user_body = root(&doc).find("section", AttrFilter::Class("userbody")).unwrap();
        assert!(notices(user_body).unwrap().is_empty());
    }

    #[test]
    fn test_missing_sections() {
        let doc = Html::parse_document(r#"<section class="userbody"></section>"#);
        let user_body = root(&doc).find("section", AttrFilter::Class("userbody")).unwrap();
        assert_eq!(post_text(user_body).unwrap_err().anchor(), Anchor::PostingBody);
        assert_eq!(notices(user_body).unwrap_err().anchor(), Anchor::Notices);
    }
}
