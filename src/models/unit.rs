//! 处理单元
//!
//! 一个单元就是交给外部服务处理的一份工作（文本块或页面图片），
//! 其位置即原始输入中的索引，创建后不可变。

use crate::models::PageImage;

/// 可被调度器分发的处理单元
pub trait Unit: Clone + Send + Sync + 'static {
    /// 处理结果是否"什么都没产出"
    ///
    /// 为真时调度器视为未修改，回退到原始单元。
    fn is_blank(&self) -> bool;
}

impl Unit for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Unit for PageImage {
    fn is_blank(&self) -> bool {
        self.png_bytes().is_empty()
    }
}
