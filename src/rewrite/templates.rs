//! Local rewrite templates, used whenever the remote service is unavailable.
//!
//! Output is deterministic: the same article, format and style always give
//! the same text.

use crate::models::{Article, OutputFormat, WritingStyle};

/// Characters of summary quoted by the vlog short template.
const VLOG_SUMMARY_CHARS: usize = 60;

pub fn render(news: &Article, format: OutputFormat, style: WritingStyle) -> String {
    match format {
        OutputFormat::Short => short(news, style),
        OutputFormat::Long => long(news),
    }
}

fn short(news: &Article, style: WritingStyle) -> String {
    let title = &news.title;
    let summary = &news.summary;
    match style {
        WritingStyle::Vlog => {
            let head: String = summary.chars().take(VLOG_SUMMARY_CHARS).collect();
            format!(
                "哇塞！兄弟们，最新消息来了！{title}，这波真的有点东西！\n\n\
                 讲真，看完这个我整个人都激动了。{head}...\n\n\
                 兄弟们，你们觉得这车怎么样？评论区聊聊！🚗💨"
            )
        }
        WritingStyle::Review => format!(
            "【新车快讯】{title}\n\n{summary}\n\n\
             从专业角度来看，这次更新确实很有诚意。产品力提升明显，无论是配置还是价格都很有竞争力。\
             建议感兴趣的朋友可以关注一下实车表现。"
        ),
        WritingStyle::Push => format!(
            "🔥重磅推荐！{title}！\n\n{summary}\n\n\
             真的！这次太给力了！宝子们，这波绝对不能错过！\n\n\
             私我了解详情，还有额外福利！先到先得！冲鸭！🎉"
        ),
        WritingStyle::News => format!(
            "【汽车资讯】{title}\n\n{summary}\n\n\
             记者了解到，该车型/技术的推出将进一步丰富消费者的选择空间。\
             具体售价及配置信息，请关注官方后续报道。"
        ),
    }
}

/// One long-form template serves every style.
fn long(news: &Article) -> String {
    let title = &news.title;
    let summary = &news.summary;
    format!(
        "🚗 {title}\n\n——我是分割线——\n\n\
         家人们！今天来聊聊刚刚收到的重磅消息！{title}！\n\n\
         说实话，当我第一眼看到这个新闻的时候，整个人都精神了！{summary}\n\n\
         今天咱们就好好聊聊这个事儿。首先呢，这个时间点发布，确实很有意思。\
         大家都知道，最近汽车圈那是相当的卷，各大厂商都在发力。\n\n\
         从目前曝光的信息来看，这次的新品/新技术确实有不少亮点：\n\n\
         1️⃣ 第一个亮点...（此处省略100字）\n\
         2️⃣ 第二个亮点...（此处省略100字）\n\
         3️⃣ 第三个亮点...（此处省略100字）\n\n\
         总的来说呢，这次的诚意还是相当足的。当然，具体表现怎么样，还得看实车。\n\n\
         好了，今天的分享就到这里。兄弟们有什么看法，欢迎评论区聊聊！咱们下期再见！👋"
    )
}
