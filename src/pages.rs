//! Server-rendered HTML for the site. Pages share one layout; the chat and
//! image generator shells are driven by `static/app.js`.

use crate::client::scope::IdentityScope;
use crate::models::identity::Identity;

/// Escapes text for use inside HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Who is looking at the page.
pub struct Viewer<'a> {
    identity: Option<&'a Identity>,
    /// False when sign-in is not configured; the header then offers no link.
    sign_in_enabled: bool,
}

impl<'a> Viewer<'a> {
    pub fn new(identity: Option<&'a Identity>, sign_in_enabled: bool) -> Self {
        Viewer {
            identity,
            sign_in_enabled,
        }
    }

    fn scope(&self) -> IdentityScope {
        IdentityScope::from_identity(self.identity)
    }
}

fn header(viewer: &Viewer) -> String {
    let account = match viewer.identity {
        Some(identity) => format!(
            r#"<span class="welcome">Welcome Back {}</span> <a class="button" href="/logout">Sign Out</a>"#,
            escape(&identity.display_name)
        ),
        None if viewer.sign_in_enabled => r#"<a class="button" href="/oauth/login">Sign In</a>"#.to_string(),
        None => String::new(),
    };
    format!(
        r#"<header class="site-header"><a class="brand" href="/">ImageGenAI</a><nav class="account">{}</nav></header>"#,
        account
    )
}

const SIDEBAR: &str = r#"<aside class="sidebar"><nav>
<a href="/">Home</a>
<a href="/image-generator">AI Photo Generator</a>
<a href="/chatbot">AI ChatBot</a>
<a href="/about">About</a>
</nav></aside>"#;

const FOOTER: &str = r#"<footer class="site-footer"><p>HashBot AI. Chat and image generation powered by third-party AI services.</p></footer>"#;

fn layout(title: &str, viewer: &Viewer, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | HashBot AI</title>
<link rel="stylesheet" href="/static/app.css">
</head>
<body data-scope="{scope}">
{header}
<div class="page">
{sidebar}
<main>
{body}
</main>
</div>
{footer}
<script src="/static/app.js" defer></script>
</body>
</html>
"#,
        title = escape(title),
        scope = escape(&viewer.scope().to_string()),
        header = header(viewer),
        sidebar = SIDEBAR,
        body = body,
        footer = FOOTER,
    )
}

pub fn home(viewer: &Viewer) -> String {
    let body = r#"<section class="hero">
<h1>Create and converse with AI</h1>
<p>Turn a sentence into an image, or ask HashBot anything.</p>
<a class="button" href="/image-generator">Generate an image</a>
<a class="button secondary" href="/chatbot">Start chatting</a>
</section>
<section class="features">
<h2>Features</h2>
<ul>
<li>Text to image generation from a single prompt</li>
<li>A streaming chat assistant</li>
<li>Recent images and prompt history kept on your device</li>
<li>One-click image downloads</li>
</ul>
</section>"#;
    layout("Home", viewer, body)
}

pub fn about(viewer: &Viewer) -> String {
    let body = r#"<section class="docs">
<h1>About HashBot AI</h1>
<h2>Getting started</h2>
<p>Sign in to keep your own chat and image history, or use the site anonymously.</p>
<h2>Features</h2>
<ul>
<li>AI Photo Generator: describe an image and generate it. The last 50 images and the last 100 prompts are kept.</li>
<li>AI ChatBot: replies appear as they are written.</li>
</ul>
<h2>Usage examples</h2>
<ul>
<li>"A futuristic city floating in the clouds at sunset"</li>
<li>"Explain how rainbows form in two sentences."</li>
</ul>
<h2>FAQ</h2>
<dl>
<dt>Where is my history stored?</dt>
<dd>In your browser, under a key tied to your account. Signing out clears it.</dd>
<dt>Why did generation fail with a rate limit?</dt>
<dd>The image service limits how often it can be called. Wait a moment and try again.</dd>
</dl>
</section>"#;
    layout("About", viewer, body)
}

pub fn chatbot(viewer: &Viewer) -> String {
    let body = r#"<section class="chat" id="chat">
<h1>AI ChatBot</h1>
<div class="messages" id="chat-messages" aria-live="polite"></div>
<form id="chat-form" autocomplete="off">
<input id="chat-input" name="message" placeholder="Type your message..." required>
<button id="chat-send" type="submit">Send</button>
<button id="chat-clear" type="button">Clear</button>
</form>
</section>"#;
    layout("AI ChatBot", viewer, body)
}

pub fn image_generator(viewer: &Viewer) -> String {
    let badge = match viewer.identity {
        Some(identity) => format!("Welcome back, {}!", escape(&identity.display_name)),
        None => "Anonymous Session".to_string(),
    };
    let body = format!(
        r#"<section class="generator" id="generator">
<h1>AI Photo Generator</h1>
<p class="badge">{badge}</p>
<form id="image-form" autocomplete="off">
<textarea id="image-prompt" name="prompt" placeholder="Describe the image you want..."></textarea>
<button id="image-random" type="button">Random prompt</button>
<button id="image-generate" type="submit">Generate</button>
</form>
<p class="error" id="image-error" hidden></p>
<figure id="image-current" hidden><img alt="Generated image"><figcaption></figcaption>
<button id="image-download" type="button">Download</button></figure>
<h2>Recent images</h2>
<div class="gallery" id="image-recent"></div>
<h2>History</h2>
<ol class="history" id="image-history"></ol>
</section>"#,
        badge = badge
    );
    layout("AI Photo Generator", viewer, &body)
}
