pub(super) fn scroll_to_top_script() -> &'static str {
    r#"window.scrollTo({ top: 0, behavior: "smooth" });"#
}
