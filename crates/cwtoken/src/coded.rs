//! HL7 v3 coded claim values (subject role, purpose of use)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{HL7_V3_NAMESPACE, XSI_NAMESPACE};
use crate::error::TokenError;
use crate::Result;

/// SNOMED CT code system OID
pub const SNOMED_CT_CODE_SYSTEM: &str = "2.16.840.1.113883.6.96";
/// SNOMED CT code system name
pub const SNOMED_CT_CODE_SYSTEM_NAME: &str = "SNOMED_CT";
/// NHIN purpose-of-use code system OID
pub const NHIN_PURPOSE_CODE_SYSTEM: &str = "2.16.840.1.113883.3.18.7.1";
/// NHIN purpose-of-use code system name
pub const NHIN_PURPOSE_CODE_SYSTEM_NAME: &str = "nhin-purpose";
/// HL7 coded-element data type
pub const CODED_ELEMENT_TYPE: &str = "CE";

/// Element a coded claim renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodedElement {
    /// `<Role>`
    Role,
    /// `<PurposeOfUse>`
    PurposeOfUse,
}

impl CodedElement {
    /// Local element name
    pub fn local_name(self) -> &'static str {
        match self {
            Self::Role => "Role",
            Self::PurposeOfUse => "PurposeOfUse",
        }
    }
}

/// A coded value from a controlled vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodedClaim {
    /// Element the claim renders as
    pub element: CodedElement,
    /// Code within the code system
    pub code: String,
    /// Code system OID
    pub code_system: String,
    /// Human-readable code system name
    pub code_system_name: String,
    /// Human-readable code meaning
    pub display_name: String,
    /// `xsi:type` of the element
    pub xsi_type: String,
}

impl CodedClaim {
    /// Subject role coded in SNOMED CT
    pub fn role(display_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            element: CodedElement::Role,
            code: code.into(),
            code_system: SNOMED_CT_CODE_SYSTEM.to_string(),
            code_system_name: SNOMED_CT_CODE_SYSTEM_NAME.to_string(),
            display_name: display_name.into(),
            xsi_type: CODED_ELEMENT_TYPE.to_string(),
        }
    }

    /// Purpose of use coded in the NHIN purpose-of-use vocabulary
    pub fn purpose_of_use(display_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            element: CodedElement::PurposeOfUse,
            code: code.into(),
            code_system: NHIN_PURPOSE_CODE_SYSTEM.to_string(),
            code_system_name: NHIN_PURPOSE_CODE_SYSTEM_NAME.to_string(),
            display_name: display_name.into(),
            xsi_type: CODED_ELEMENT_TYPE.to_string(),
        }
    }

    /// Replace the code system
    pub fn with_code_system(
        mut self,
        code_system: impl Into<String>,
        code_system_name: impl Into<String>,
    ) -> Self {
        self.code_system = code_system.into();
        self.code_system_name = code_system_name.into();
        self
    }

    /// Canonical XML rendering
    ///
    /// Attribute order is fixed (`xsi` declaration, `xsi:type`, `code`,
    /// `codeSystem`, `codeSystemName`, `displayName`, default namespace) and
    /// relying parties compare it byte for byte.
    pub fn to_xml(&self) -> String {
        format!(
            r#"<{name} xmlns:xsi="{xsi}" xsi:type="{ty}" code="{code}" codeSystem="{system}" codeSystemName="{system_name}" displayName="{display}" xmlns="{ns}" />"#,
            name = self.element.local_name(),
            xsi = XSI_NAMESPACE,
            ty = Escaped(&self.xsi_type),
            code = Escaped(&self.code),
            system = Escaped(&self.code_system),
            system_name = Escaped(&self.code_system_name),
            display = Escaped(&self.display_name),
            ns = HL7_V3_NAMESPACE,
        )
    }

    /// Read a coded claim back from its XML rendering
    ///
    /// Accepts empty elements (`<Role ... />`) and start/end tag pairs with
    /// only whitespace between them; attribute values may use either quote.
    /// Empty input yields a claim with every attribute empty.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidInput`] when the input is not a single
    /// element with well-formed attributes.
    pub fn from_xml(element: CodedElement, xml: &str) -> Result<Self> {
        let mut claim = Self {
            element,
            code: String::new(),
            code_system: String::new(),
            code_system_name: String::new(),
            display_name: String::new(),
            xsi_type: String::new(),
        };

        let xml = xml.trim();
        if xml.is_empty() {
            return Ok(claim);
        }

        let not_element = || TokenError::invalid_input("coded claim is not an XML element");
        let tag = xml.strip_prefix('<').ok_or_else(not_element)?;
        let name_end = tag
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .ok_or_else(not_element)?;
        let (name, mut rest) = tag.split_at(name_end);
        if name.is_empty() {
            return Err(not_element());
        }

        loop {
            rest = rest.trim_start();
            if let Some(after) = rest.strip_prefix("/>") {
                if !after.trim().is_empty() {
                    return Err(TokenError::invalid_input(
                        "unexpected content after coded claim element",
                    ));
                }
                return Ok(claim);
            }
            if let Some(after) = rest.strip_prefix('>') {
                let closing = after
                    .trim()
                    .strip_prefix("</")
                    .and_then(|end| end.strip_suffix('>'))
                    .map(str::trim_end);
                if closing != Some(name) {
                    return Err(TokenError::invalid_input(format!(
                        "coded claim element {name} is not closed"
                    )));
                }
                return Ok(claim);
            }

            let (attribute, value, after) = next_attribute(rest)?;
            match attribute {
                "xsi:type" => claim.xsi_type = value,
                "code" => claim.code = value,
                "codeSystem" => claim.code_system = value,
                "codeSystemName" => claim.code_system_name = value,
                "displayName" => claim.display_name = value,
                _ => {}
            }
            rest = after;
        }
    }
}

/// Split `name="value"` (or `name='value'`) off the front of `input`
fn next_attribute(input: &str) -> Result<(&str, String, &str)> {
    let (name, rest) = input
        .split_once('=')
        .ok_or_else(|| TokenError::invalid_input("coded claim attribute without value"))?;
    let name = name.trim_end();
    let malformed = |c: char| c.is_whitespace() || matches!(c, '<' | '>' | '/');
    if name.is_empty() || name.contains(malformed) {
        return Err(TokenError::invalid_input(format!(
            "malformed coded claim attribute name: {name}"
        )));
    }

    let rest = rest.trim_start();
    let quote = rest
        .chars()
        .next()
        .filter(|c| matches!(c, '"' | '\''))
        .ok_or_else(|| TokenError::invalid_input("coded claim attribute value is not quoted"))?;
    let (value, rest) = rest[1..]
        .split_once(quote)
        .ok_or_else(|| TokenError::invalid_input("unterminated coded claim attribute value"))?;
    Ok((name, unescape(value), rest))
}

fn unescape(value: &str) -> String {
    value
        .replace("&#xA;", "\n")
        .replace("&#xD;", "\r")
        .replace("&#x9;", "\t")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Attribute-value escaping as performed by XML writers
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\n' => f.write_str("&#xA;")?,
                '\r' => f.write_str("&#xD;")?,
                '\t' => f.write_str("&#x9;")?,
                c => write!(f, "{c}")?,
            }
        }
        Ok(())
    }
}
