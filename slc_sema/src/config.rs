//! Small, explicit configuration passed into the checker's constructor,
//! rather than a global or environment-variable switch.

#[derive(Debug, Clone, Copy)]
pub struct CheckerConfig {
    /// Unary `+`/`-` is documented in the source this language descends
    /// from to always produce an Integer result, even for a Float
    /// operand. Defaults to `true` (preserve the observed behavior).
    /// Set to `false` to instead have unary `+`/`-` inherit the
    /// operand's numeric type.
    pub preserve_unary_integer_bug: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            preserve_unary_integer_bug: true,
        }
    }
}
