use std::collections::BTreeMap;

use core_types::UiLanguage;

#[derive(Debug, Clone)]
pub struct I18n {
    lang: UiLanguage,
    zh_cn: BTreeMap<&'static str, &'static str>,
    en_us: BTreeMap<&'static str, &'static str>,
}

impl Default for I18n {
    fn default() -> Self {
        Self::new(UiLanguage::default())
    }
}

impl I18n {
    pub fn new(lang: UiLanguage) -> Self {
        Self {
            lang,
            zh_cn: zh_cn_map(),
            en_us: en_us_map(),
        }
    }

    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        match self.lang {
            UiLanguage::ZhCn => self
                .zh_cn
                .get(key)
                .copied()
                .or_else(|| self.en_us.get(key).copied())
                .unwrap_or(key),
            UiLanguage::EnUs => self
                .en_us
                .get(key)
                .copied()
                .or_else(|| self.zh_cn.get(key).copied())
                .unwrap_or(key),
        }
    }
}

const WELCOME_EN: &str = "Welcome to SpendWise! 🎉\n\n\
I'm here to help you understand your spending patterns with ease. Simply upload your bank statement, and I'll categorize your transactions into the following categories:\n\
- Fitness\n\
- Groceries\n\
- Restaurants and Cafes\n\
- Healthcare\n\
- Clothing\n\
- Jewelry\n\
- Transportation\n\
- Phone and Internet\n\
- Miscellaneous\n\
- Others\n\
- E-commerce\n\
- Food Delivery\n\n\
Currently, I support statements from NBD Bank. If you want to give me a try, I already have a sample data loaded for you.";

const WELCOME_ZH: &str = "欢迎使用 SpendWise！🎉\n\n\
上传你的银行对账单，我会把交易归入以下类别：\n\
- 健身\n\
- 日用杂货\n\
- 餐厅与咖啡馆\n\
- 医疗保健\n\
- 服装\n\
- 珠宝\n\
- 交通\n\
- 电话与网络\n\
- 杂项\n\
- 其他\n\
- 电子商务\n\
- 外卖\n\n\
目前支持 NBD 银行的对账单。已为你预置了一份示例数据，可以直接提问。";

fn zh_cn_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.title", "欢迎使用 SPENDWISE"),
        ("splash.tagline", "你的消费分析助手"),
        ("chat.welcome", WELCOME_ZH),
        ("chat.you", "我"),
        ("chat.bot", "SpendWise"),
        ("chat.attachment", "附件"),
        ("chat.hint", "输入问题后回车发送；/upload <pdf 路径> 上传对账单；/help 查看命令；/quit 退出"),
        ("chat.query.failed", "处理你的问题时出错，请重试。"),
        ("chat.upload.failed", "上传 PDF 时出错，请重试。"),
        ("chat.upload.no_report", "错误：服务器未返回报告内容。"),
        ("chat.empty", "消息不能为空。"),
        ("picker.rejected", "只能上传 PDF 文件"),
        ("status.uploading", "正在上传……"),
        ("status.succeeded", "✔ 上传成功"),
        ("status.failed", "✘ 上传失败"),
    ])
}

fn en_us_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.title", "WELCOME TO SPENDWISE"),
        ("splash.tagline", "your spending companion"),
        ("chat.welcome", WELCOME_EN),
        ("chat.you", "You"),
        ("chat.bot", "SpendWise"),
        ("chat.attachment", "attachment"),
        (
            "chat.hint",
            "Type a question and press enter; /upload <pdf path> uploads a statement; /help lists commands; /quit exits",
        ),
        (
            "chat.query.failed",
            "There was an error processing your query. Please try again.",
        ),
        (
            "chat.upload.failed",
            "An error occurred while uploading the PDF. Please try again.",
        ),
        (
            "chat.upload.no_report",
            "Error: No report content received from the server.",
        ),
        ("chat.empty", "Message cannot be empty."),
        ("picker.rejected", "Only PDF files can be uploaded"),
        ("status.uploading", "Uploading…"),
        ("status.succeeded", "✔ Upload complete"),
        ("status.failed", "✘ Upload failed"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_chinese_translation() {
        let i18n = I18n::new(UiLanguage::ZhCn);
        assert_eq!(i18n.t("chat.you"), "我");
    }

    #[test]
    fn defaults_to_english() {
        let i18n = I18n::default();
        assert_eq!(
            i18n.t("chat.query.failed"),
            "There was an error processing your query. Please try again."
        );
    }

    #[test]
    fn welcome_lists_categories() {
        let i18n = I18n::default();
        let welcome = i18n.t("chat.welcome");
        assert!(welcome.contains("- Groceries\n"));
        assert!(welcome.contains("NBD Bank"));
    }

    #[test]
    fn chinese_catalog_covers_fixed_errors() {
        let i18n = I18n::new(UiLanguage::ZhCn);
        assert_eq!(i18n.t("chat.upload.no_report"), "错误：服务器未返回报告内容。");
    }

    #[test]
    fn falls_back_to_key_when_missing() {
        let i18n = I18n::new(UiLanguage::EnUs);
        assert_eq!(i18n.t("not.exists"), "not.exists");
    }
}
