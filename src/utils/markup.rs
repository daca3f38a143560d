//! 题目文本规范化
//!
//! 题库返回的题干/答案是 HTML + LaTeX/KaTeX 混排的富文本，大模型的回答里也常带
//! `\(...\)`、`$...$` 之类的公式写法。本模块把它们统一转成人能直接读的纯文本：
//!
//! 1. 提取 `<img src=...>` 中的图片地址（单双引号均可，保留出现顺序和重复项）
//! 2. 去掉所有 HTML 标签，`<br>` 转为换行
//! 3. 去掉公式定界符，把常见 LaTeX 命令改写成 Unicode/ASCII 符号
//! 4. 行内空白压缩为单个空格，保留换行
//!
//! 规范化是幂等的：对输出再跑一遍不会有任何变化，所以同一个函数既可以用在题库原文
//! 上，也可以用在模型生成的答案上。无法匹配的写法原样保留，从不报错。

use phf::phf_map;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// 填空题下划线统一展开成的长度
pub const BLANK: &str = "______";

/// 规范化结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// 纯文本
    pub text: String,
    /// 按出现顺序提取出的图片地址（未补全协议）
    pub images: Vec<String>,
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("内置正则非法 {pattern}: {e}"))
}

static BR_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)<br\s*/?>"));
static IMG_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#)
});
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?s)<!--.*?-->"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>"));

static INLINE_MATH_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?s)\\+[(（](.*?)\\+[)）]"));
static DISPLAY_MATH_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?s)\\+\[(.*?)\\+\]"));
static DOUBLE_DOLLAR_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(?s)\\*\$\$(.*?)\\*\$\$"));
static DOLLAR_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\\*\$([^$]*?)\\*\$"));

static LEFT_RIGHT_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\\+(?:left|right)\b\s*\.?"));
static SQRT_INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"\\+sqrt\s*\[\s*([^\[\]]*?)\s*\]\s*\{\s*([^{}]*?)\s*\}"));
static SQRT_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\\+sqrt\s*\{\s*([^{}]*?)\s*\}"));
static SQRT_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"\\+sqrt(?:\s+([A-Za-z0-9]+)|([0-9]+))"));
static FRAC_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"\\+[dt]?frac\s*\{\s*([^{}]*?)\s*\}\s*\{\s*([^{}]*?)\s*\}")
});
static TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"\\+(?:text|textbf|textit|textrm|mathrm|mathbf|mathit|boldsymbol|operatorname)\s*\{\s*([^{}]*?)\s*\}")
});
static SUB_RE: LazyLock<Regex> = LazyLock::new(|| re(r"_\{\s*([^{}]*?)\s*\}"));
static SUP_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\^\{\s*([^{}]*?)\s*\}"));
static SPACING_CMD_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\\+[,;:! ]"));
static CONTROL_SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\\+([{}%&#_])"));
static CONTROL_WORD_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\\+([A-Za-z]+)"));

static BLANK_RE: LazyLock<Regex> = LazyLock::new(|| re(r"_{3,}"));
static OP_AFTER_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| re(r"(\d)([+\-×÷=])"));
static DIGIT_AFTER_OP_RE: LazyLock<Regex> = LazyLock::new(|| re(r"([+\-×÷=])(\d)"));
static BLANK_AFTER_CMP_RE: LazyLock<Regex> = LazyLock::new(|| re(r"([=<>≤≥≠]) ?(______)"));

/// LaTeX 控制词 → 可读符号
///
/// 不在表里的控制词原样保留。
static SYMBOLS: phf::Map<&'static str, &'static str> = phf_map! {
    "square" => "□",
    "bigcirc" => "○",
    "circ" => "°",
    "degree" => "°",
    "gt" => " > ",
    "lt" => " < ",
    "ge" => "≥",
    "geq" => "≥",
    "geqslant" => "≥",
    "le" => "≤",
    "leq" => "≤",
    "leqslant" => "≤",
    "ne" => "≠",
    "neq" => "≠",
    "approx" => "≈",
    "equiv" => "≡",
    "times" => "×",
    "div" => "÷",
    "pm" => "±",
    "mp" => "∓",
    "cdot" => "·",
    "cdots" => "......",
    "ldots" => "...",
    "dots" => "...",
    "sum" => "∑",
    "prod" => "∏",
    "int" => "∫",
    "infty" => "∞",
    "angle" => "∠",
    "triangle" => "△",
    "perp" => "⊥",
    "parallel" => "∥",
    "because" => "∵",
    "therefore" => "∴",
    "in" => "∈",
    "notin" => "∉",
    "subset" => "⊂",
    "subseteq" => "⊆",
    "cup" => "∪",
    "cap" => "∩",
    "emptyset" => "∅",
    "varnothing" => "∅",
    "rightarrow" => "→",
    "to" => "→",
    "Rightarrow" => "⇒",
    "leftarrow" => "←",
    "Leftrightarrow" => "⇔",
    "quad" => " ",
    "qquad" => " ",
    "pi" => "π",
    "alpha" => "α",
    "beta" => "β",
    "gamma" => "γ",
    "delta" => "δ",
    "Delta" => "Δ",
    "epsilon" => "ε",
    "varepsilon" => "ε",
    "theta" => "θ",
    "lambda" => "λ",
    "mu" => "μ",
    "rho" => "ρ",
    "sigma" => "σ",
    "Sigma" => "Σ",
    "phi" => "φ",
    "varphi" => "φ",
    "omega" => "ω",
    "Omega" => "Ω",
};

/// 规范化一段富文本
///
/// 对输出再次调用本函数得到相同的 `text`，且 `images` 为空。
pub fn normalize(raw: &str) -> Normalized {
    let mut images = Vec::new();
    let mut text = raw.to_string();

    // 嵌套每深一层多一轮，层数不会超过输入长度
    for _ in 0..=raw.len() {
        let next = rewrite_pass(&text, &mut images);
        if next == text {
            break;
        }
        text = next;
    }

    Normalized { text, images }
}

/// 只要文本，不关心图片
pub fn normalize_text(raw: &str) -> String {
    normalize(raw).text
}

/// 把题库里的图片地址补全成带协议的绝对地址
///
/// - `//host/a.png` → `https://host/a.png`
/// - `host/a.png` → `https://host/a.png`
/// - 已经带协议的地址原样返回
pub fn resolve_image_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("//") {
        format!("https:{url}")
    } else if url.contains("://") || url.starts_with("data:") {
        url.to_string()
    } else {
        format!("https://{}", url.trim_start_matches('/'))
    }
}

fn rewrite_pass(input: &str, images: &mut Vec<String>) -> String {
    let text = BR_RE.replace_all(input, "\n");

    let text = IMG_RE.replace_all(&text, |caps: &Captures| {
        let src = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        if !src.is_empty() {
            images.push(src.to_string());
        }
        ""
    });

    let text = COMMENT_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "");
    let text = text.replace("&nbsp;", " ");

    let text = INLINE_MATH_RE.replace_all(&text, "${1}");
    let text = DISPLAY_MATH_RE.replace_all(&text, "${1}");
    let text = DOUBLE_DOLLAR_RE.replace_all(&text, "${1}");
    let text = DOLLAR_RE.replace_all(&text, "${1}");

    let text = rewrite_latex(&text);
    let text = collapse_whitespace(&text);

    let text = BLANK_RE.replace_all(&text, BLANK);
    let text = OP_AFTER_DIGIT_RE.replace_all(&text, "${1} ${2}");
    let text = DIGIT_AFTER_OP_RE.replace_all(&text, "${1} ${2}");
    let text = BLANK_AFTER_CMP_RE.replace_all(&text, "${1} ${2}");

    text.into_owned()
}

/// 结构性命令（根号、分数、文本、上下标）先于符号表处理，
/// 这样嵌套时内层先被改写，下一轮再处理外层
fn rewrite_latex(text: &str) -> String {
    let text = LEFT_RIGHT_RE.replace_all(text, "");
    let text = SQRT_INDEX_RE.replace_all(&text, "${1}√${2}");
    let text = SQRT_RE.replace_all(&text, "√${1}");
    let text = SQRT_BARE_RE.replace_all(&text, "√${1}${2}");
    let text = FRAC_RE.replace_all(&text, "${1}/${2}");
    let text = TEXT_RE.replace_all(&text, "${1}");
    let text = SUB_RE.replace_all(&text, "_${1}");
    let text = SUP_RE.replace_all(&text, "^${1}");
    let text = SPACING_CMD_RE.replace_all(&text, " ");
    let text = CONTROL_SYMBOL_RE.replace_all(&text, "${1}");
    let text = CONTROL_WORD_RE.replace_all(&text, |caps: &Captures| {
        match SYMBOLS.get(&caps[1]) {
            Some(symbol) => (*symbol).to_string(),
            None => caps[0].to_string(),
        }
    });
    text.into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    text.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
