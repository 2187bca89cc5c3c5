/// Languages the error dialog is translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Spanish,
    Chinese,
}

impl Language {
    /// Resolves a tag such as `es-mx`, `zh_CN` or `EN`. Unknown tags fall
    /// back to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "es" => Language::Spanish,
            "zh" => Language::Chinese,
            _ => Language::English,
        }
    }

    pub fn detect() -> Self {
        crate::core::platform::system::detect_ui_language()
            .map(|tag| Self::from_tag(&tag))
            .unwrap_or_default()
    }
}

/// Text of the "no runtime" dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeMissingText {
    pub title: &'static str,
    pub body: &'static str,
}

pub fn runtime_missing(language: Language) -> RuntimeMissingText {
    match language {
        Language::English => RuntimeMissingText {
            title: "Java not found",
            body: "InterfaceOficial needs Java 8 or newer (Java 11+ recommended), \
                   and none could be found or installed automatically.\n\n\
                   Press OK to open the download page in your browser.",
        },
        Language::Spanish => RuntimeMissingText {
            title: "No se encontró Java",
            body: "InterfaceOficial necesita Java 8 o superior (se recomienda Java 11+) \
                   y no se pudo encontrar ni instalar automáticamente.\n\n\
                   Pulsa Aceptar para abrir la página de descarga en el navegador.",
        },
        Language::Chinese => RuntimeMissingText {
            title: "未找到 Java",
            body: "InterfaceOficial 需要 Java 8 或更高版本（推荐 Java 11+），\
                   但未能找到或自动安装。\n\n\
                   点击“确定”在浏览器中打开下载页面。",
        },
    }
}
