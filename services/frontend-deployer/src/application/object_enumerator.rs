//! バケット内オブジェクトキーの列挙
//!
//! ListObjectsV2を継続トークンで辿る遅延ページャー。
//! `next_page`を呼ぶたびに1ページ分だけ取得し、最終ページの後はNoneを返す。

use tracing::debug;

use crate::infrastructure::{MAX_KEYS_PER_REQUEST, ObjectStoreOps, ObjectStoreOpsError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PagerState {
    Start,
    Continue(String),
    Done,
}

/// オブジェクトキーのページャー
pub struct ObjectKeyPager<'a, S: ObjectStoreOps + ?Sized> {
    store: &'a S,
    bucket: &'a str,
    page_size: usize,
    state: PagerState,
    pages_fetched: usize,
}

impl<'a, S: ObjectStoreOps + ?Sized> ObjectKeyPager<'a, S> {
    /// 1ページ1000件で列挙するページャーを作成
    pub fn new(store: &'a S, bucket: &'a str) -> Self {
        Self {
            store,
            bucket,
            page_size: MAX_KEYS_PER_REQUEST,
            state: PagerState::Start,
            pages_fetched: 0,
        }
    }

    /// ページサイズを変更（1〜1000に丸める）
    #[cfg(test)]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_KEYS_PER_REQUEST);
        self
    }

    /// 次のページを取得する
    ///
    /// エラーを返した後は終端となる。
    pub async fn next_page(&mut self) -> Option<Result<Vec<String>, ObjectStoreOpsError>> {
        let token = match &self.state {
            PagerState::Done => return None,
            PagerState::Start => None,
            PagerState::Continue(token) => Some(token.clone()),
        };

        let result = self
            .store
            .list_objects_page(self.bucket, token.as_deref(), self.page_size)
            .await;

        match result {
            Ok(page) => {
                self.pages_fetched += 1;
                self.state = match page.next_continuation_token {
                    Some(next) => PagerState::Continue(next),
                    None => PagerState::Done,
                };
                debug!(
                    bucket = %self.bucket,
                    page = self.pages_fetched,
                    key_count = page.keys.len(),
                    "オブジェクト一覧ページを取得"
                );
                Some(Ok(page.keys))
            }
            Err(err) => {
                self.state = PagerState::Done;
                Some(Err(err))
            }
        }
    }

    /// 先頭から列挙し直す
    pub fn restart(&mut self) {
        self.state = PagerState::Start;
        self.pages_fetched = 0;
    }

    /// 取得済みページ数
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// 残りの全ページを取得してキーを連結する
    pub async fn collect_all(&mut self) -> Result<Vec<String>, ObjectStoreOpsError> {
        let mut keys = Vec::new();
        while let Some(page) = self.next_page().await {
            keys.extend(page?);
        }
        Ok(keys)
    }
}
