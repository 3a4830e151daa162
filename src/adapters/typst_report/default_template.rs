//! Built-in Typst report template.
//!
//! Placeholders: `{{TITLE}}`, `{{HEADER}}`, `{{SECTIONS}}`, `{{CHART}}`.
//! A custom template may use any subset of them.

const DEFAULT_TEMPLATE: &str = r##"#set page(paper: "a4", margin: (x: 2cm, y: 2cm), numbering: "1")
#set text(size: 11pt)
#show heading.where(level: 2): it => block(above: 1.4em, below: 0.8em)[
  #text(fill: rgb("#1f3b73"))[#it.body]
  #line(length: 100%, stroke: 0.5pt + gray)
]

#align(center)[
  #text(size: 20pt, weight: "bold")[{{TITLE}}]
]

{{HEADER}}

#line(length: 100%)

{{SECTIONS}}

== Candlestick Chart

{{CHART}}
"##;

pub fn template() -> &'static str {
    DEFAULT_TEMPLATE
}
