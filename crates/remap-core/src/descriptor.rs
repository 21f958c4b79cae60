//! JVM descriptor translation.
//!
//! Descriptors embed class names (`Lcom/example/Foo;`). When classes get
//! renamed, descriptors stored alongside member renames must be rewritten so
//! they stay anchored to a consistent set of type names.

use thiserror::Error;

/// Error for malformed field or method descriptors.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// A class reference opened with `L` but never closed with `;`.
    #[error("unterminated class reference at offset {offset} in '{descriptor}'")]
    UnterminatedClass { offset: usize, descriptor: String },

    /// A character outside the descriptor grammar.
    #[error("unexpected character '{found}' at offset {offset} in '{descriptor}'")]
    UnexpectedCharacter {
        found: char,
        offset: usize,
        descriptor: String,
    },
}

/// Rewrite every embedded class reference through `rename`.
///
/// Handles both field descriptors (`[Lcom/example/Foo;`) and method
/// descriptors (`(ILcom/example/Foo;)V`). Names for which `rename` returns
/// `None` are kept as-is.
pub fn remap_descriptor<F>(descriptor: &str, mut rename: F) -> Result<String, DescriptorError>
where
    F: FnMut(&str) -> Option<String>,
{
    let bytes = descriptor.as_bytes();
    let mut out = String::with_capacity(descriptor.len());
    let mut offset = 0;
    while offset < bytes.len() {
        let c = bytes[offset] as char;
        match c {
            'L' => {
                let end = descriptor[offset + 1..]
                    .find(';')
                    .map(|p| offset + 1 + p)
                    .ok_or_else(|| DescriptorError::UnterminatedClass {
                        offset,
                        descriptor: descriptor.to_string(),
                    })?;
                let name = &descriptor[offset + 1..end];
                out.push('L');
                match rename(name) {
                    Some(mapped) => out.push_str(&mapped),
                    None => out.push_str(name),
                }
                out.push(';');
                offset = end + 1;
            }
            'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' | 'V' | '[' | '(' | ')' => {
                out.push(c);
                offset += 1;
            }
            _ => {
                return Err(DescriptorError::UnexpectedCharacter {
                    found: c,
                    offset,
                    descriptor: descriptor.to_string(),
                })
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rename(name: &str) -> Option<String> {
        match name {
            "a/Old" => Some("b/New".to_string()),
            _ => None,
        }
    }

    #[test]
    fn primitives_pass_through() {
        assert_eq!(remap_descriptor("I", rename).unwrap(), "I");
        assert_eq!(remap_descriptor("[[J", rename).unwrap(), "[[J");
    }

    #[test]
    fn class_references_are_rewritten() {
        assert_eq!(remap_descriptor("La/Old;", rename).unwrap(), "Lb/New;");
        assert_eq!(remap_descriptor("[La/Old;", rename).unwrap(), "[Lb/New;");
        assert_eq!(
            remap_descriptor("La/Other;", rename).unwrap(),
            "La/Other;"
        );
    }

    #[test]
    fn method_descriptors_rewrite_every_position() {
        assert_eq!(
            remap_descriptor("(ILa/Old;[La/Old;)La/Old;", rename).unwrap(),
            "(ILb/New;[Lb/New;)Lb/New;"
        );
    }

    #[test]
    fn unterminated_class_reference_is_rejected() {
        let error = remap_descriptor("La/Old", rename).unwrap_err();
        assert!(matches!(error, DescriptorError::UnterminatedClass { .. }));
    }

    #[test]
    fn unknown_characters_are_rejected() {
        let error = remap_descriptor("(Q)V", rename).unwrap_err();
        assert!(matches!(
            error,
            DescriptorError::UnexpectedCharacter { found: 'Q', .. }
        ));
    }
}
