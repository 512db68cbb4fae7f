//! `--<key> <value>` token scanning over a raw argument vector

/// Render the flag token for a key (`ScriptingBackend` -> `--ScriptingBackend`).
pub fn flag(key: &str) -> String {
    format!("--{key}")
}

/// Read-only view over the toolchain's argument vector.
///
/// Keys are matched exactly (case-sensitive) and the first occurrence wins.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentTokens<'a> {
    args: &'a [String],
}

impl<'a> ArgumentTokens<'a> {
    pub fn new(args: &'a [String]) -> Self {
        Self { args }
    }

    /// True when a token equal to `--<key>` appears anywhere.
    pub fn has_flag(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// The token immediately following `--<key>`, if both exist.
    pub fn value_of(&self, key: &str) -> Option<&'a str> {
        let index = self.position(key)?;
        self.args.get(index + 1).map(String::as_str)
    }

    fn position(&self, key: &str) -> Option<usize> {
        let wanted = flag(key);
        self.args.iter().position(|token| *token == wanted)
    }
}
