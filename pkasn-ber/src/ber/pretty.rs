//! Human-readable dump of BER data
//!
//! One line per object:
//!
//! ```text
//! d= 0, l=   6: SEQUENCE/CONSTRUCTED
//! d= 1, l=   1:   INTEGER 5
//! d= 1, l=   1:   BOOLEAN true
//! ```

use crate::ber::config::DecoderConfig;
use crate::ber::decoder::BerDecoder;
use crate::ber::integer::decode_integer_content;
use crate::ber::object::BerObject;
use crate::ber::oid::decode_oid_content;
use pkasn_core::{describe_tag, BerResult, ClassTag, TypeTag};

/// Renders a BER structure as an indented tree
#[derive(Debug, Clone)]
pub struct PrettyPrinter {
    max_depth: usize,
    config: DecoderConfig,
}

impl Default for PrettyPrinter {
    fn default() -> Self {
        Self {
            max_depth: 64,
            config: DecoderConfig::default(),
        }
    }
}

impl PrettyPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop descending into constructed values below this depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Render every object in `data`
    ///
    /// # Error Handling
    /// Any decoding error aborts the dump.
    pub fn print(&self, data: &[u8]) -> BerResult<String> {
        let mut out = String::new();
        let mut decoder = BerDecoder::new(data).with_config(self.config);
        self.print_level(&mut out, &mut decoder, 0)?;
        Ok(out)
    }

    fn print_level(
        &self,
        out: &mut String,
        decoder: &mut BerDecoder<'_>,
        depth: usize,
    ) -> BerResult<()> {
        while decoder.more_items()? {
            let object = decoder.get_next_object()?;
            let Some((type_tag, class_tag)) = object.tagging() else {
                break;
            };

            out.push_str(&format!(
                "d={:2}, l={:4}: {:indent$}{}",
                depth,
                object.len(),
                "",
                describe_tag(type_tag, class_tag),
                indent = depth * 2
            ));

            if class_tag.is_constructed() {
                if depth + 1 >= self.max_depth {
                    out.push_str(" ...\n");
                    continue;
                }
                out.push('\n');
                let mut inner = BerDecoder::from_object(object).with_config(self.config);
                self.print_level(out, &mut inner, depth + 1)?;
            } else {
                let value = format_value(type_tag, class_tag, &object);
                if !value.is_empty() {
                    out.push(' ');
                    out.push_str(&value);
                }
                out.push('\n');
            }
        }
        Ok(())
    }
}

fn format_value(type_tag: TypeTag, class_tag: ClassTag, object: &BerObject) -> String {
    let bytes = object.value();
    if class_tag != ClassTag::UNIVERSAL {
        return hex(bytes);
    }
    match type_tag {
        TypeTag::NULL => String::new(),
        TypeTag::BOOLEAN => match bytes {
            [value] => (*value != 0).to_string(),
            _ => hex(bytes),
        },
        TypeTag::INTEGER | TypeTag::ENUMERATED => decode_integer_content(bytes).to_string(),
        TypeTag::OBJECT_ID => match decode_oid_content(bytes) {
            Ok(oid) => oid.to_string(),
            Err(_) => hex(bytes),
        },
        TypeTag::UTF8_STRING
        | TypeTag::NUMERIC_STRING
        | TypeTag::PRINTABLE_STRING
        | TypeTag::T61_STRING
        | TypeTag::IA5_STRING
        | TypeTag::VISIBLE_STRING
        | TypeTag::UTC_TIME
        | TypeTag::GENERALIZED_TIME => String::from_utf8_lossy(bytes).into_owned(),
        _ => hex(bytes),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
