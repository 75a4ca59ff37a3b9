//! Flash embed markup construction
//!
//! `build_embed_markup` produces the `<object>`/`<embed>` pair legacy plugin
//! hosts expect. Attribute names and values are bit-exact: hosts match them
//! literally.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::dom::Element;

/// MIME type announced on the compatibility `<embed>` element
pub const FLASH_MIME_TYPE: &str = "application/x-shockwave-flash";

/// Bytes a URI component escapes; `-_.!~*'()` and alphanumerics stay literal
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Width or height of the embedded player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(u32),
    Css(String),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Pixels(px) => write!(f, "{}", px),
            Dimension::Css(s) => f.write_str(s),
        }
    }
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Dimension::Pixels(px)
    }
}

impl From<&str> for Dimension {
    fn from(s: &str) -> Self {
        Dimension::Css(s.to_string())
    }
}

/// Everything `build_embed_markup` needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedParams {
    pub width: Dimension,
    pub height: Dimension,
    pub id: String,
    pub player_type: String,
    pub swf: String,
    pub wmode: String,
    pub flash_vars: BTreeMap<String, String>,
}

/// Serialize flash vars as `key=value` pairs joined by `&`, each side
/// URI-component encoded with spaces written as `+`
pub fn serialize_flash_vars(vars: &BTreeMap<String, String>) -> String {
    vars.iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT)
        .to_string()
        .replace("%20", "+")
}

/// Plugin parameters in the order they appear as `<param>` children
fn plugin_parameters(params: &EmbedParams) -> [(&'static str, String); 6] {
    [
        ("allowScriptAccess", "always".to_string()),
        ("allowfullscreen", "true".to_string()),
        ("movie", params.swf.clone()),
        ("wmode", params.wmode.clone()),
        ("quality", "high".to_string()),
        ("FlashVars", serialize_flash_vars(&params.flash_vars)),
    ]
}

fn set_visual_attributes(el: &mut Element, params: &EmbedParams) {
    el.set_attribute("width", params.width.to_string());
    el.set_attribute("height", params.height.to_string());
    el.set_attribute("id", params.id.as_str());
    el.set_attribute("name", params.id.as_str());
}

/// Build the detached embed subtree for a Flash player.
///
/// Pure: no plugin or network access, and the same params always yield a
/// structurally identical tree. Inserting the tree is up to the caller.
pub fn build_embed_markup(params: &EmbedParams) -> Element {
    let plugin_params = plugin_parameters(params);

    let mut object = Element::new("object");
    set_visual_attributes(&mut object, params);
    object.set_attribute("playerType", params.player_type.as_str());
    for (name, value) in &plugin_params {
        object.append_child(
            Element::new("param")
                .with_attribute("name", *name)
                .with_attribute("value", value.as_str()),
        );
    }

    let mut embed = Element::new("embed");
    for (name, value) in &plugin_params {
        let attr = if *name == "movie" { "src" } else { *name };
        embed.set_attribute(attr, value.as_str());
    }
    set_visual_attributes(&mut embed, params);
    embed.set_attribute("swLiveConnect", "true");
    embed.set_attribute("type", FLASH_MIME_TYPE);
    object.append_child(embed);

    object
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EmbedParams {
        let mut flash_vars = BTreeMap::new();
        flash_vars.insert("autostart".to_string(), "false".to_string());
        EmbedParams {
            width: Dimension::Pixels(640),
            height: Dimension::Pixels(360),
            id: "p1".into(),
            player_type: "flash".into(),
            swf: "foo.swf".into(),
            wmode: "transparent".into(),
            flash_vars,
        }
    }

    fn param_value<'a>(object: &'a Element, name: &str) -> Option<&'a str> {
        object
            .children_by_tag("param")
            .find(|p| p.attribute("name") == Some(name))
            .and_then(|p| p.attribute("value"))
    }

    #[test]
    fn object_carries_params_in_order() {
        let object = build_embed_markup(&params());
        assert_eq!(object.tag(), "object");
        assert_eq!(object.attribute("width"), Some("640"));
        assert_eq!(object.attribute("height"), Some("360"));
        assert_eq!(object.attribute("id"), Some("p1"));
        assert_eq!(object.attribute("name"), Some("p1"));
        assert_eq!(object.attribute("playerType"), Some("flash"));

        let names: Vec<_> = object
            .children_by_tag("param")
            .filter_map(|p| p.attribute("name"))
            .collect();
        assert_eq!(
            names,
            ["allowScriptAccess", "allowfullscreen", "movie", "wmode", "quality", "FlashVars"]
        );
        assert_eq!(param_value(&object, "movie"), Some("foo.swf"));
        assert_eq!(param_value(&object, "wmode"), Some("transparent"));
        assert_eq!(param_value(&object, "FlashVars"), Some("autostart=false"));
        assert_eq!(param_value(&object, "quality"), Some("high"));
    }

    #[test]
    fn embed_mirrors_object() {
        let object = build_embed_markup(&params());
        let embed = object.children_by_tag("embed").next().unwrap();
        assert_eq!(embed.attribute("src"), Some("foo.swf"));
        assert_eq!(embed.attribute("movie"), None);
        assert_eq!(embed.attribute("width"), Some("640"));
        assert_eq!(embed.attribute("name"), Some("p1"));
        assert_eq!(embed.attribute("swLiveConnect"), Some("true"));
        assert_eq!(embed.attribute("type"), Some(FLASH_MIME_TYPE));
        assert_eq!(embed.attribute("FlashVars"), Some("autostart=false"));
        // embed is the last child
        assert_eq!(object.children().last().map(Element::tag), Some("embed"));
    }

    #[test]
    fn flash_vars_are_form_encoded() {
        let mut vars = BTreeMap::new();
        vars.insert("file".to_string(), "http://x.test/a b.flv".to_string());
        vars.insert("autostart".to_string(), "true".to_string());
        assert_eq!(
            serialize_flash_vars(&vars),
            "autostart=true&file=http%3A%2F%2Fx.test%2Fa+b.flv"
        );
        assert_eq!(serialize_flash_vars(&BTreeMap::new()), "");
    }

    #[test]
    fn flash_vars_keep_component_safe_punctuation() {
        let mut vars = BTreeMap::new();
        vars.insert("title".to_string(), "it's (live)!~*".to_string());
        vars.insert("q".to_string(), "a&b=c+d%".to_string());
        assert_eq!(
            serialize_flash_vars(&vars),
            "q=a%26b%3Dc%2Bd%25&title=it's+(live)!~*"
        );
    }

    #[test]
    fn css_dimensions_pass_through() {
        let mut p = params();
        p.width = Dimension::from("100%");
        let object = build_embed_markup(&p);
        assert_eq!(object.attribute("width"), Some("100%"));
    }

    #[test]
    fn markup_is_deterministic() {
        let a = build_embed_markup(&params());
        let b = build_embed_markup(&params());
        assert_eq!(a, b);
        assert_eq!(a.to_html(), b.to_html());
    }
}
