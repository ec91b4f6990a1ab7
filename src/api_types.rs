use serde::Deserialize;

use crate::models::RawHeat;

/* Weibo hot search: GET https://weibo.com/ajax/side/hotSearch */

#[derive(Debug, Clone, Deserialize)]
pub struct WeiboHotSearch {
    #[serde(default)]
    pub data: Option<WeiboData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeiboData {
    #[serde(default)]
    pub realtime: Vec<WeiboTopic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeiboTopic {
    pub word: String,
    #[serde(default)]
    pub num: Option<RawHeat>, // number for most entries, display string for some
}

/* Bilibili trending: GET https://api.bilibili.com/x/web-interface/search/square */

#[derive(Debug, Clone, Deserialize)]
pub struct BiliSearchSquare {
    pub code: i64,
    #[serde(default)]
    pub data: Option<BiliData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiliData {
    #[serde(default)]
    pub trending: Option<BiliTrending>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiliTrending {
    #[serde(default)]
    pub list: Vec<BiliTopic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiliTopic {
    pub keyword: String,
    #[serde(default)]
    pub heat_score: Option<RawHeat>,
}
