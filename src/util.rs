//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge client payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_strings_pass_through() {
    assert_eq!(trunc_for_log("abc", 10), "abc");
  }

  #[test]
  fn long_strings_are_cut_on_char_boundary() {
    assert_eq!(trunc_for_log("abcdef", 3), "abc… (6 bytes total)");
    // 'é' is two bytes; cutting at 1 must not split it.
    assert_eq!(trunc_for_log("éé", 1), "… (4 bytes total)");
  }
}
