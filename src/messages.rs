use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Success,
    Info,
    Warning,
    Error,
}

/// A user-facing dialog as the browser consoles render it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub title: &'static str,
    pub text: &'static str,
}

const SUCCESS: &str = "Başarılı";
const INFO: &str = "Bilgi";
const WARNING: &str = "Uyarı";
const ERROR: &str = "Hata";

const fn success(text: &'static str) -> Message {
    Message {
        kind: MessageKind::Success,
        title: SUCCESS,
        text,
    }
}
const fn info(text: &'static str) -> Message {
    Message {
        kind: MessageKind::Info,
        title: INFO,
        text,
    }
}
const fn warning(text: &'static str) -> Message {
    Message {
        kind: MessageKind::Warning,
        title: WARNING,
        text,
    }
}
const fn error(text: &'static str) -> Message {
    Message {
        kind: MessageKind::Error,
        title: ERROR,
        text,
    }
}

// employees
pub const EMPLOYEE_CREATED: Message = success("Personel/stajyer başarıyla eklendi.");
pub const EMPLOYEE_CREATE_FAILED: Message = error("Personel/stajyer eklenirken bir hata oluştu.");
pub const EMPLOYEE_INVALID_TYPE: Message =
    warning("Geçersiz personel tipi. Personel veya Stajyer seçiniz.");
pub const EMPLOYEES_LOAD_FAILED: Message = warning("Lütfen sisteme personel tanımlayınız.");
pub const EMPLOYEES_EMPTY: Message = info("Henüz personel tanımlı değil.");
pub const EMPLOYEE_DELETE_FAILED: Message = error("Personel/stajyer silinirken bir hata oluştu.");
pub const EMPLOYEE_NOT_FOUND: Message = error("Personel bulunamadı");
pub const EMPLOYEE_LOAD_FAILED: Message = error("Personel bilgisi alınırken bir hata oluştu");
pub const EMPLOYEE_NOT_SELECTED: Message = warning("Lütfen bir personel seçiniz.");
pub const EMPLOYEE_NAME_REQUIRED: Message = warning("Lütfen personel adını giriniz.");
pub const EMPLOYEE_INVALID_ID: Message = error("Geçersiz personel ID formatı");

// works
pub const WORK_NOT_FOUND: Message = error("İş kaydı bulunamadı.");
pub const WORK_INVALID_ID: Message = error("Geçersiz ID formatı.");
pub const WORK_CREATE_FAILED: Message = error("İş kaydı oluşturulurken bir hata oluştu.");
pub const WORK_UPDATE_FAILED: Message = error("İş kaydı güncellenirken bir hata oluştu.");
pub const WORK_CONFLICT: Message =
    warning("İş kaydı başka bir işlem tarafından güncellendi, lütfen tekrar deneyin.");
pub const WORKS_LOAD_FAILED: Message = error("İşler yüklenirken bir hata oluştu");
pub const WORK_INVALID_END_TIME: Message =
    warning("Bitiş zamanı başlangıç zamanından önce olamaz.");
pub const WORK_COMPLETED_VIDEO_LOCKED: Message =
    warning("Tamamlanmış videonun açıklaması veya bağlantısı değiştirilemez.");
pub const WORK_ALREADY_COMPLETED: Message = warning("Tamamlanmış iş yeniden açılamaz.");
pub const WORK_NOT_COMPLETED: Message = warning("Video henüz tamamlanmadı.");
pub const WORK_REVIEWS_APPEND_ONLY: Message = warning("Mevcut incelemeler değiştirilemez.");
pub const REVISION_NOT_REQUESTED: Message =
    warning("Bu video için henüz revizyon talebi oluşturulmamış.");
pub const REVISION_VIDEO_REQUIRED: Message = warning("Lütfen revize edilecek videoyu seçiniz.");
pub const REVISION_VIDEO_NOT_FOUND: Message = error("Revize edilecek video bulunamadı.");

// lists
pub const APPROVED_VIDEOS_LOAD_FAILED: Message =
    error("Onaylanmış videolar yüklenirken bir hata oluştu");
pub const APPROVED_VIDEOS_EMPTY: Message = info("Henüz onaylanmış video bulunmuyor");
pub const COMPLETED_VIDEOS_LOAD_FAILED: Message = error("Videolar yüklenirken bir hata oluştu");
pub const COMPLETED_VIDEOS_EMPTY: Message = info("İncelenecek video bulunmuyor");
pub const REVIEWED_VIDEOS_LOAD_FAILED: Message =
    error("İncelenmiş videolar yüklenirken bir hata oluştu");
pub const REVIEWED_VIDEOS_EMPTY: Message = info("Henüz incelenmiş video bulunmuyor");

// request shape
pub const INVALID_DATE: Message = error("Geçersiz tarih formatı");
pub const INVALID_REQUEST: Message = error("Geçersiz istek verisi.");
pub const PAGE_NOT_FOUND: Message = error("Sayfa bulunamadı.");
pub const STORE_FAILED: Message = error("Veritabanı işlemi sırasında bir hata oluştu.");
