//! Synthetic sample articles, the pipeline's terminal fallback.
//!
//! Shapes are fixed (a bank of twelve real-looking launch/sales stories),
//! the draw and the timestamps are random. This path cannot fail.

use crate::models::{Article, PLACEHOLDER_URL};
use crate::search::SearchRequest;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::info;

struct SampleTemplate {
    title: &'static str,
    summary: &'static str,
    source: &'static str,
}

const SAMPLE_BANK: &[SampleTemplate] = &[
    SampleTemplate {
        title: "比亚迪秦L DM-i正式上市 售价7.98万起",
        summary: "比亚迪官方宣布，秦L DM-i正式上市，共推出5款车型，售价区间7.98-12.98万元。新车搭载第五代DM-i混动技术，NEDC工况下综合续航可达2000km。",
        source: "autohome",
    },
    SampleTemplate {
        title: "特斯拉Model Y新版车型申报 续航提升至600km",
        summary: "工信部最新申报信息显示，特斯拉Model Y将推出新版本车型，配备更大容量电池组，续航里程提升至600km以上，预计年内上市。",
        source: "yiche",
    },
    SampleTemplate {
        title: "小米SU7订单突破10万 创最快交付纪录",
        summary: "小米汽车官方数据显示，SU7上市仅7天大定订单突破10万台，创下新能源车最快交付纪录。目前已开启全国交付。",
        source: "dongche",
    },
    SampleTemplate {
        title: "全新宝马5系正式发布 搭载最新iDrive 8.5系统",
        summary: "宝马官方正式发布全新一代5系轿车，内饰全面升级，配备最新iDrive 8.5操作系统，提供燃油和纯电两种动力版本。",
        source: "pcauto",
    },
    SampleTemplate {
        title: "理想汽车销量突破20万 新款L6将于下月发布",
        summary: "理想汽车宣布累计交付量突破20万台，同时透露全新车型L6将于下月正式发布，定位中大型SUV，预售价25万元起。",
        source: "sina",
    },
    SampleTemplate {
        title: "问界M9大定超5万 华为鸿蒙座舱成亮点",
        summary: "AITO官方宣布，问界M9大定订单突破5万台。华为鸿蒙智能座舱成为最大卖点，配备百万像素智慧大灯。",
        source: "autohome",
    },
    SampleTemplate {
        title: "极氪001全新改款 续航达1000km",
        summary: "极氪官方发布2025款极氪001，搭载全新一代电池技术，CLTC工况下续航里程达1000km，充电5分钟可行驶200km。",
        source: "yiche",
    },
    SampleTemplate {
        title: "大众ID.7 Vizzion正式上市 定价22.77万起",
        summary: "一汽-大众ID.7 Vizzion正式上市，提供三种配置车型，售价22.77-26.77万元。新车基于MEB平台打造，轴距达2965mm。",
        source: "dongche",
    },
    SampleTemplate {
        title: "蔚来ET9正式发布 配备全线控底盘技术",
        summary: "蔚来在NIO Day上正式发布ET9，定位旗舰轿车，配备全线控底盘技术，支持L4级别智能驾驶，预售价80万元起。",
        source: "pcauto",
    },
    SampleTemplate {
        title: "吉利银河E8正式上市 搭载45英寸8K大屏",
        summary: "吉利银河E8正式上市，售价17.58-22.88万元。新车最大亮点是配备45英寸8K分辨率中控屏，搭载高通8295芯片。",
        source: "sina",
    },
    SampleTemplate {
        title: "方程豹豹5销量破万 硬派越野市场再掀波澜",
        summary: "方程豹官方宣布，豹5上市首月销量突破1万台。凭借DMO超级混动越野平台，成为硬派越野市场新宠。",
        source: "autohome",
    },
    SampleTemplate {
        title: "小鹏X9正式发布 定位纯电智能MPV",
        summary: "小鹏汽车正式发布X9，定位纯电智能MPV，配备后轮转向、空气悬架等配置，预售价38.8万元起。",
        source: "yiche",
    },
];

/// Draw sample articles for `requests`, newest first, at most `max`.
///
/// Each source gets two to four stories, its own templates first; the draw
/// is topped up from the rest of the bank so at least `max` distinct titles
/// exist whenever the bank allows it.
pub fn generate(requests: &[SearchRequest], window_days: u32, max: usize) -> Vec<Article> {
    generate_at(requests, window_days, max, Utc::now())
}

pub fn generate_at(
    requests: &[SearchRequest],
    window_days: u32,
    max: usize,
    now: DateTime<Utc>,
) -> Vec<Article> {
    let mut rng = rand::rng();
    let earliest = crate::pipeline::recency::cutoff_for(window_days, now);
    let window_minutes = (now - earliest).num_minutes().max(1);
    let stamp = now.timestamp_millis();
    let mut used: HashSet<&'static str> = HashSet::new();
    let mut news: Vec<Article> = Vec::new();

    let mut push = |template: &SampleTemplate, request: &SearchRequest, rng: &mut rand::rngs::ThreadRng| {
        let minutes_ago = rng.random_range(0..window_minutes);
        news.push(Article {
            id: format!("{}_sample_{}_{}", request.source_id, news.len(), stamp),
            title: template.title.to_string(),
            summary: template.summary.to_string(),
            source: request.source_id.clone(),
            source_name: Some(request.source_name.clone()),
            url: PLACEHOLDER_URL.to_string(),
            publish_time: Some(
                now.checked_sub_signed(Duration::minutes(minutes_ago))
                    .unwrap_or(earliest),
            ),
        });
    };

    for request in requests {
        let count = rng.random_range(2..=4);
        let mut pool: Vec<&SampleTemplate> = SAMPLE_BANK
            .iter()
            .filter(|t| t.source == request.source_id || rng.random_bool(0.5))
            .collect();
        pool.sort_by_key(|t| t.source != request.source_id);

        for template in pool
            .into_iter()
            .filter(|t| !used.contains(t.title))
            .take(count)
            .collect::<Vec<_>>()
        {
            used.insert(template.title);
            push(template, request, &mut rng);
        }
    }

    let wanted = max.min(SAMPLE_BANK.len());
    if used.len() < wanted && !requests.is_empty() {
        let mut rest: Vec<&SampleTemplate> = SAMPLE_BANK
            .iter()
            .filter(|t| !used.contains(t.title))
            .collect();
        rest.shuffle(&mut rng);
        for (i, template) in rest.into_iter().take(wanted - used.len()).enumerate() {
            push(template, &requests[i % requests.len()], &mut rng);
        }
    }

    news.sort_by(|a, b| b.publish_time.cmp(&a.publish_time));
    news.truncate(max);
    info!(count = news.len(), "Generated sample articles");
    news
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(id: &str) -> SearchRequest {
        SearchRequest {
            source_id: id.to_string(),
            source_name: id.to_string(),
            query: String::new(),
            max_results: 10,
            window_days: 1,
        }
    }

    #[test]
    fn test_always_fills_to_max() {
        for ids in [vec!["autohome"], vec!["all"], vec!["yiche", "sina", "custom_1"]] {
            let requests: Vec<_> = ids.iter().map(|id| request(id)).collect();
            for _ in 0..20 {
                let news = generate(&requests, 1, 5);
                assert_eq!(news.len(), 5, "sources {ids:?}");
            }
        }
    }

    #[test]
    fn test_sorted_newest_first_within_window() {
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap();
        let news = generate_at(&[request("autohome"), request("yiche")], 3, 5, now);
        let times: Vec<_> = news.iter().map(|a| a.publish_time.unwrap()).collect();
        assert!(times.windows(2).all(|w| w[0] >= w[1]));
        assert!(times.iter().all(|t| *t <= now && *t > now - Duration::days(3)));
    }

    #[test]
    fn test_titles_are_distinct_and_sources_come_from_selection() {
        let news = generate(&[request("dongche")], 1, 5);
        let titles: HashSet<_> = news.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles.len(), news.len());
        assert!(news.iter().all(|a| a.source == "dongche" && a.url == "#"));
    }

    #[test]
    fn test_huge_window_still_generates() {
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap();
        for window in [200_000_000, u32::MAX] {
            let news = generate_at(&[request("autohome")], window, 5, now);
            assert_eq!(news.len(), 5);
            assert!(news.iter().all(|a| a.publish_time.unwrap() <= now));
        }
    }

    #[test]
    fn test_no_requests_yields_nothing() {
        assert!(generate(&[], 1, 5).is_empty());
    }
}
