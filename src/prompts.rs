pub const SYSTEM_CLASSIFY: &str =
    "你是识别网络梗的助手，能够准确判断一个词语或短语是否为网络梗。";

pub const SYSTEM_EXPLAIN: &str =
    "你是一个专门解释网络梗的助手，能够用简洁的语言解释各种网络流行语的含义。";

/// Affirmative token the classifier accepts; anything else means "no".
pub const AFFIRMATIVE: &str = "是";

pub fn user_classify(name: &str) -> String {
    format!(
        r#"请判断以下文本是否是一个"网络梗"。

网络梗的定义：普罗大众都知道的一个有趣的事件、短语、表达方式或者流行语，通常具有幽默性、娱乐性，在网络上广泛传播并被大家理解和使用。

网络梗的特征：
1. 具有趣味性和娱乐性
2. 在网络上广泛传播
3. 大部分网民都能理解其含义
4. 经常用于表达情绪或观点
5. 具有一定的文化内涵或背景故事

不是网络梗的例子：
- 纯粹的新闻事件（如"地震"、"事故"等）
- 严肃的政治话题
- 单纯的人名或地名
- 技术术语或专业词汇

待判断文本："{name}"

请只回答"是"或"否"，不要解释。"#
    )
}

pub fn user_explain(name: &str) -> String {
    format!(
        r#"请为网络梗"{name}"生成一个简洁的解释（不超过20个字）。

要求：
1. 解释要通俗易懂，让不了解这个梗的人能快速理解
2. 说明这个梗的含义、用法或来源
3. 语言要简洁，控制在20字以内
4. 不要包含"网络梗"、"流行语"等词汇

只返回解释内容，不要其他说明。"#
    )
}
