use scraper::node::Node;
use scraper::Html;

/// Elements whose text never reaches the output
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new run of text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "h1", "h2", "h3", "h4",
    "h5", "h6", "hr", "li", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Converts an HTML fragment into plain text
///
/// Tags are dropped, the content of script and style elements is discarded,
/// entities are decoded by the parser and all whitespace is collapsed into
/// single spaces. Block-level elements are separated by a space so that
/// `<p>a</p><p>b</p>` reads `"a b"` rather than `"ab"`.
///
/// # Examples
///
/// ```
/// use vagas_ripple::extract::html_to_text;
///
/// let text = html_to_text("<p>Vaga para <b>analista</b></p><script>x()</script>");
/// assert_eq!(text, "Vaga para analista");
/// ```
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::with_capacity(html.len());

    for node in fragment.tree.root().descendants() {
        match node.value() {
            Node::Element(element) if BLOCK_ELEMENTS.contains(&element.name()) => {
                text.push(' ');
            }
            Node::Text(fragment_text) => {
                let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
                    Node::Element(element) => SKIPPED_ELEMENTS.contains(&element.name()),
                    _ => false,
                });
                if !hidden {
                    text.push_str(fragment_text);
                }
            }
            _ => {}
        }
    }

    collapse_whitespace(&text)
}

/// Collapses every whitespace run into a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_and_scripts() {
        let html = r#"<div><style>.a{color:red}</style><p>Olá,&nbsp;mundo</p>
            <script>alert("x")</script><ul><li>Um</li><li>Dois</li></ul></div>"#;
        assert_eq!(html_to_text(html), "Olá, mundo Um Dois");
    }

    #[test]
    fn test_block_elements_are_separated() {
        assert_eq!(html_to_text("<p>a</p><p>b</p>"), "a b");
        assert_eq!(html_to_text("linha<br>outra"), "linha outra");
        assert_eq!(html_to_text("<b>a</b><i>b</i>"), "ab");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(html_to_text("  texto   simples \n"), "texto simples");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace(" a \t b\n\nc "), "a b c");
    }
}
