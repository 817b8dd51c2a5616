//! Strips conversational markdown wrapping from model output.

/// Remove one leading fenced-code marker (optionally language-tagged) and one
/// trailing marker, then trim. Interior fences are left untouched and the
/// remainder is not validated as Python.
///
/// An opening marker is a whole fence line with a body after it; a closing
/// marker sits on its own line. A lone leftover fence is left alone, so
/// cleaning an already-cleaned string changes nothing.
pub fn clean_code(raw: &str) -> String {
    let mut text = raw.trim();

    let mut opened = false;
    if text.starts_with("```") {
        if let Some((_, body)) = text.split_once('\n') {
            text = body;
            opened = true;
        }
    }

    let end_trimmed = text.trim_end();
    text = if opened && end_trimmed == "```" {
        // Opened block whose entire body is the closing marker: empty code.
        ""
    } else {
        match end_trimmed.strip_suffix("```") {
            Some(body) if body.ends_with('\n') => body,
            _ => end_trimmed,
        }
    };

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_plain_fences() {
        assert_eq!(clean_code("```\nprint('hi')\n```"), "print('hi')");
    }

    #[test]
    fn strips_tagged_fences() {
        assert_eq!(
            clean_code("```python\npct = 64.8\nprint(pct)\n```"),
            "pct = 64.8\nprint(pct)"
        );
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(clean_code("  \n```python\nx = 1\n```\n  "), "x = 1");
    }

    #[test]
    fn leaves_bare_code_alone() {
        assert_eq!(clean_code("print('hi')"), "print('hi')");
    }

    #[test]
    fn leaves_interior_fences_untouched() {
        let code = "print('```')\nprint('done')";
        assert_eq!(clean_code(code), code);
    }

    #[test]
    fn trailing_fence_must_sit_on_its_own_line() {
        assert_eq!(clean_code("print(1)```"), "print(1)```");
        assert_eq!(clean_code("x = 1\n```"), "x = 1");
    }

    #[test]
    fn idempotent() {
        for input in [
            "```python\nprint(1)\n```",
            "```\nprint(1)\n```",
            "print(1)",
            "  print(1)  ",
            "",
            "```",
            "```python",
            "```\n```\n```",
            "print(1)```",
            "x = 1\n```",
        ] {
            let once = clean_code(input);
            assert_eq!(clean_code(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn fenced_fence_keeps_its_content() {
        // The outer pair comes off; the interior fence is content.
        assert_eq!(clean_code("```\n```\n```"), "```");
    }

    #[test]
    fn empty_fenced_block_yields_empty() {
        assert_eq!(clean_code("```python\n```"), "");
        assert_eq!(clean_code("```\n```"), "");
    }

    #[test]
    fn lone_fence_is_unchanged() {
        assert_eq!(clean_code("```"), "```");
        assert_eq!(clean_code("```python"), "```python");
    }
}
