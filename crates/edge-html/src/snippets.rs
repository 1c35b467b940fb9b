//! Instrumentation and client bootstrap snippets.
//!
//! Every snippet is produced by a pure function. Instrumentation is gated once
//! on the request's production and admin flags; a loader returning `None` is
//! not configured and is not emitted.

use edge_core::SiteConfig;
use edge_security::CspNonce;

use crate::hydration::to_script_json;

/// `localStorage` key holding analytics consent.
pub const ANALYTICS_CONSENT_KEY: &str = "consent.analytics";

/// `localStorage` key holding marketing consent.
pub const MARKETING_CONSENT_KEY: &str = "consent.marketing";

/// Element id of the scroll guard style.
pub const SCROLL_GUARD_ID: &str = "ssr-scroll-guard";

const CONSENT_BOOTSTRAP_JS: &str = r#"(function(){try{var p=new URLSearchParams(window.location.search);var s=window.localStorage;function v(x){if(x===null)return null;x=x.toLowerCase();if(x==='1'||x==='true'||x==='yes'||x==='granted')return'granted';if(x==='0'||x==='false'||x==='no'||x==='denied')return'denied';return null}var all=v(p.get('consent'));if(all){s.setItem('consent.analytics',all);s.setItem('consent.marketing',all)}var a=v(p.get('analytics'));if(a)s.setItem('consent.analytics',a);var m=v(p.get('marketing'));if(m)s.setItem('consent.marketing',m)}catch(e){}})();"#;

const SCROLL_GUARD_JS: &str = r#"(function(){try{if('scrollRestoration' in history)history.scrollRestoration='manual';if(window.location.pathname==='/'&&!window.location.hash)window.scrollTo(0,0)}catch(e){}requestAnimationFrame(function(){var g=document.getElementById('ssr-scroll-guard');if(g&&g.parentNode)g.parentNode.removeChild(g)})})();"#;

const SCROLL_GUARD_CSS: &str = "html,body{overflow-anchor:none}";

const REACT_REFRESH_PREAMBLE_JS: &str = r#"import RefreshRuntime from "/@react-refresh";RefreshRuntime.injectIntoGlobalHook(window);window.$RefreshReg$=()=>{};window.$RefreshSig$=()=>(type)=>type;window.__vite_plugin_react_preamble_installed__=true;"#;

/// Where a snippet is placed in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Inside `<head>`.
    Head,
    /// Before `</body>`.
    BodyEnd,
}

/// One element of a snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetPart {
    /// Classic inline script.
    Script(String),
    /// Inline module script.
    ModuleScript(String),
    /// External module script.
    ExternalModule { src: String },
    /// Inline style element with an id.
    Style { id: String, css: String },
}

impl SnippetPart {
    /// Render with `nonce` on every script and style element.
    pub fn render(&self, nonce: &CspNonce) -> String {
        let nonce = nonce.value();
        match self {
            Self::Script(js) => format!(r#"<script nonce="{}">{}</script>"#, nonce, js),
            Self::ModuleScript(js) => {
                format!(r#"<script type="module" nonce="{}">{}</script>"#, nonce, js)
            }
            Self::ExternalModule { src } => format!(
                r#"<script type="module" nonce="{}" src="{}"></script>"#,
                nonce,
                html_escape::encode_double_quoted_attribute(src)
            ),
            Self::Style { id, css } => format!(
                r#"<style id="{}" nonce="{}">{}</style>"#,
                html_escape::encode_double_quoted_attribute(id),
                nonce,
                css
            ),
        }
    }
}

/// A named group of elements emitted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Name for logs and tests.
    pub name: &'static str,
    /// Document placement.
    pub placement: Placement,
    /// Elements, in order.
    pub parts: Vec<SnippetPart>,
}

impl Snippet {
    fn new(name: &'static str, placement: Placement) -> Self {
        Self {
            name,
            placement,
            parts: Vec::new(),
        }
    }

    fn with(mut self, part: SnippetPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Render every element.
    pub fn render(&self, nonce: &CspNonce) -> String {
        self.parts
            .iter()
            .map(|part| part.render(nonce))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Whether instrumentation may run for a request.
pub fn instrumentation_allowed(is_production: bool, is_admin_path: bool) -> bool {
    is_production && !is_admin_path
}

/// Copies `?consent=`, `?analytics=` and `?marketing=` opt-ins into `localStorage`.
pub fn consent_bootstrap() -> Snippet {
    Snippet::new("consent-bootstrap", Placement::Head)
        .with(SnippetPart::Script(CONSENT_BOOTSTRAP_JS.to_string()))
}

/// Loads analytics once analytics consent is stored.
///
/// Omitted when no analytics id is configured.
pub fn analytics_loader(config: &SiteConfig) -> Option<Snippet> {
    let id = config.analytics_id.as_deref()?;
    let id_json = to_script_json(id).ok()?;

    let js = format!(
        r#"(function(){{try{{if(window.localStorage.getItem('{key}')!=='granted')return}}catch(e){{return}}var id={id};window.dataLayer=window.dataLayer||[];window.gtag=function(){{window.dataLayer.push(arguments)}};window.gtag('js',new Date());window.gtag('config',id,{{anonymize_ip:true}});var s=document.createElement('script');s.async=true;s.nonce=document.currentScript&&document.currentScript.nonce;s.src='https://www.googletagmanager.com/gtag/js?id='+encodeURIComponent(id);document.head.appendChild(s)}})();"#,
        key = ANALYTICS_CONSENT_KEY,
        id = id_json
    );

    Some(Snippet::new("analytics-loader", Placement::Head).with(SnippetPart::Script(js)))
}

/// Loads the third-party tracking script once marketing consent is stored.
///
/// Omitted when no tracking script URL is configured.
pub fn tracking_loader(config: &SiteConfig) -> Option<Snippet> {
    let src = config.tracking_script_url.as_deref()?;
    let src_json = to_script_json(src).ok()?;

    let js = format!(
        r#"(function(){{try{{if(window.localStorage.getItem('{key}')!=='granted')return}}catch(e){{return}}var s=document.createElement('script');s.async=true;s.defer=true;s.nonce=document.currentScript&&document.currentScript.nonce;s.src={src};document.body.appendChild(s)}})();"#,
        key = MARKETING_CONSENT_KEY,
        src = src_json
    );

    Some(Snippet::new("tracking-loader", Placement::BodyEnd).with(SnippetPart::Script(js)))
}

/// Consent, analytics and tracking snippets that apply to a request.
pub fn instrumentation_snippets(
    is_production: bool,
    is_admin_path: bool,
    config: &SiteConfig,
) -> Vec<Snippet> {
    if !instrumentation_allowed(is_production, is_admin_path) {
        return Vec::new();
    }
    [
        Some(consent_bootstrap()),
        analytics_loader(config),
        tracking_loader(config),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Disables scroll anchoring until first paint and pins `/` to the top.
pub fn scroll_guard() -> Snippet {
    Snippet::new("scroll-guard", Placement::Head)
        .with(SnippetPart::Style {
            id: SCROLL_GUARD_ID.to_string(),
            css: SCROLL_GUARD_CSS.to_string(),
        })
        .with(SnippetPart::Script(SCROLL_GUARD_JS.to_string()))
}

/// Dev server client and React refresh runtime, on non-production hosts.
pub fn dev_preamble(is_production: bool) -> Option<Snippet> {
    if is_production {
        return None;
    }
    Some(
        Snippet::new("dev-preamble", Placement::Head)
            .with(SnippetPart::ExternalModule {
                src: "/@vite/client".to_string(),
            })
            .with(SnippetPart::ModuleScript(REACT_REFRESH_PREAMBLE_JS.to_string())),
    )
}
